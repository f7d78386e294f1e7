use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A `groupId:artifactId:version` triple.
///
/// Coordinates are the identity of everything the resolver touches: cache keys,
/// duplicate detection and tree node equality all compare coordinates only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Relative path of this coordinate's manifest inside a repository layout:
    /// `<group with '.' replaced by '/'>/<artifact>/<version>/<artifact>-<version>.pom`.
    pub fn manifest_path(&self) -> String {
        format!(
            "{}/{}/{}/{}-{}.pom",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.artifact_id,
            self.version
        )
    }

    /// Whether this coordinate names the given `groupId:artifactId` pair.
    pub fn is(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }
}

/// A `<dependency>` entry exactly as declared, placeholders included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub type_: Option<String>,
    pub scope: Option<String>,
    pub classifier: Option<String>,
    pub optional: bool,
    pub exclusions: Vec<Exclusion>,
}

impl RawDependency {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
            type_: None,
            scope: None,
            classifier: None,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    /// Declared packaging type; `jar` when absent.
    pub fn packaging_type(&self) -> &str {
        self.type_.as_deref().unwrap_or("jar")
    }

    /// `<type>pom</type>` + `<scope>import</scope>` inside dependency management.
    pub fn is_bom_import(&self) -> bool {
        self.packaging_type() == "pom" && self.scope.as_deref() == Some("import")
    }

    pub fn is(&self, group_id: &str, artifact_id: &str) -> bool {
        self.group_id == group_id && self.artifact_id == artifact_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
    pub active_by_default: bool,
    /// Raw JDK version range, e.g. `1.8`, `[11,)` or `9,`.
    pub jdk: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub activation: Option<Activation>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<RawDependency>,
    pub dependency_management: Vec<RawDependency>,
}

/// Parser output for one manifest. Nothing here is resolved: group and version may
/// be inherited from the parent and any value may still contain `${...}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawManifest {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<Coordinate>,
    pub properties: BTreeMap<String, String>,
    pub profiles: Vec<Profile>,
    pub dependencies: Vec<RawDependency>,
    pub dependency_management: Vec<RawDependency>,
    pub modules: Vec<String>,
}
