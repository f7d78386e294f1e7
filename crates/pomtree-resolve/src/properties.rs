use std::collections::HashSet;
use std::sync::OnceLock;

use pomtree_pom::Coordinate;
use regex::Regex;

use crate::cache::ManifestCache;
use crate::effective::EffectiveManifest;

/// Key of a whole-value placeholder: `${key}` -> `key`.
pub(crate) fn placeholder_key(value: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^\$\{([^}]+)\}$").expect("valid regex"));
    re.captures(value.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub(crate) fn is_placeholder(value: &str) -> bool {
    placeholder_key(value).is_some()
}

/// Resolves `${...}` placeholders, climbing the `<parent>` chain through the cache.
#[derive(Clone, Copy)]
pub struct PropertyResolver<'a> {
    cache: &'a ManifestCache,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(cache: &'a ManifestCache) -> Self {
        Self { cache }
    }

    /// Returns `value` unchanged unless it is exactly `${key}`.
    ///
    /// Keys missing from `manifest` are looked up in its parent, grandparent, ... with
    /// the original placeholder. A placeholder that cannot be resolved (no such key,
    /// unreachable parent, reference cycle) is returned as-is.
    pub fn resolve(&self, value: &str, manifest: &EffectiveManifest) -> String {
        let mut seen = HashSet::new();
        self.resolve_in(value, manifest, &mut seen)
    }

    fn resolve_in(
        &self,
        value: &str,
        manifest: &EffectiveManifest,
        seen: &mut HashSet<(Coordinate, String)>,
    ) -> String {
        let Some(key) = placeholder_key(value) else {
            return value.to_string();
        };
        if !seen.insert((manifest.coordinate().clone(), value.to_string())) {
            tracing::warn!(
                target: "pomtree.resolve",
                coordinate = %manifest.coordinate(),
                placeholder = %value,
                "circular property reference; leaving placeholder unresolved"
            );
            return value.to_string();
        }

        let coordinate = manifest.coordinate();
        let found = match key {
            "project.version" => Some(coordinate.version.as_str()),
            "project.groupId" => Some(coordinate.group_id.as_str()),
            "project.artifactId" => Some(coordinate.artifact_id.as_str()),
            other => manifest.properties().get(other).map(String::as_str),
        };
        if let Some(found) = found {
            return if is_placeholder(found) {
                self.resolve_in(found, manifest, seen)
            } else {
                found.to_string()
            };
        }

        let Some(parent) = manifest.parent_ref() else {
            return value.to_string();
        };
        match self.cache.get(parent) {
            Ok(parent) => self.resolve_in(value, &parent, seen),
            Err(err) => {
                tracing::debug!(
                    target: "pomtree.resolve",
                    placeholder = %value,
                    error = %err,
                    "parent unavailable while resolving property"
                );
                value.to_string()
            }
        }
    }
}
