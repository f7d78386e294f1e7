//! Profile activation.

use std::collections::BTreeSet;

use pomtree_pom::Profile;

use crate::version_range::{ArtifactVersion, VersionRange};

/// Inputs that decide which profiles apply during one resolution run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationContext {
    jdk: String,
    profiles: BTreeSet<String>,
}

impl ActivationContext {
    /// `jdk` is a Java specification version such as `1.8`, `8` or `17`.
    pub fn new(jdk: impl Into<String>) -> Self {
        Self {
            jdk: jdk.into(),
            profiles: BTreeSet::new(),
        }
    }

    pub fn with_profiles<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profiles.extend(profiles.into_iter().map(Into::into));
        self
    }

    pub fn jdk(&self) -> &str {
        &self.jdk
    }

    pub fn profiles(&self) -> &BTreeSet<String> {
        &self.profiles
    }

    /// No profile was requested by name, so `activeByDefault` profiles apply.
    pub fn is_default(&self) -> bool {
        self.profiles.is_empty()
    }

    /// JDK version used for range checks; `8` is spelled `1.8` in activation ranges.
    fn range_jdk(&self) -> &str {
        match self.jdk.as_str() {
            "8" => "1.8",
            other => other,
        }
    }

    /// Whether `profile` applies in this context.
    ///
    /// Explicitly requested ids win, then `activeByDefault` (only while nothing was
    /// requested), then a JDK range. Anything else is inactive.
    pub fn is_active(&self, profile: &Profile) -> bool {
        if self.profiles.contains(&profile.id) {
            return true;
        }
        let Some(activation) = &profile.activation else {
            return false;
        };
        if activation.active_by_default && self.is_default() {
            return true;
        }
        let Some(jdk) = activation.jdk.as_deref() else {
            return false;
        };

        let range = normalize_jdk_range(jdk);
        match VersionRange::parse(&range) {
            Ok(range) => range.contains(&ArtifactVersion::new(self.range_jdk())),
            Err(err) => {
                tracing::warn!(
                    target: "pomtree.resolve",
                    profile = %profile.id,
                    range = %jdk,
                    error = %err,
                    "ignoring profile with invalid JDK activation range"
                );
                false
            }
        }
    }
}

/// `9,` becomes `[9,)` and a bare `1.8` becomes `[1.8]`.
pub fn normalize_jdk_range(range: &str) -> String {
    let mut range = range.trim().to_string();
    let open_ended = range.ends_with(',');
    if open_ended {
        range.push(')');
    }
    if !range.starts_with(['[', '(']) {
        range = if open_ended {
            format!("[{range}")
        } else {
            format!("[{range}]")
        };
    }
    range
}
