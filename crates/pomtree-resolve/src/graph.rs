//! Transitive dependency graph construction.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;
use pomtree_pom::{Coordinate, Exclusion, RawDependency};
use serde::{Serialize, Serializer};

use crate::cache::ManifestCache;
use crate::effective::EffectiveManifest;
use crate::error::ResolveError;
use crate::properties::{is_placeholder, PropertyResolver};
use crate::scope::{effective_scope, Scope};
use crate::versions::VersionResolver;

/// One node of a resolved dependency tree.
///
/// Equality and hashing look at the coordinate only; type, scope and children are
/// ignored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveDependency {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(rename = "type")]
    pub type_: String,
    pub scope: Scope,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub exclusions: IndexSet<Exclusion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EffectiveDependency>,
    /// The coordinate was already discovered elsewhere in the run; this node is not expanded.
    pub duplicate: bool,
}

impl EffectiveDependency {
    pub fn new(coordinate: Coordinate, type_: impl Into<String>, scope: Scope) -> Self {
        Self {
            coordinate,
            type_: type_.into(),
            scope,
            exclusions: IndexSet::new(),
            children: Vec::new(),
            duplicate: false,
        }
    }

    fn from_declaration(dependency: &RawDependency, version: String, scope: Scope) -> Self {
        let mut node = Self::new(
            Coordinate::new(
                dependency.group_id.clone(),
                dependency.artifact_id.clone(),
                version,
            ),
            dependency.packaging_type(),
            scope,
        );
        node.exclusions = dependency.exclusions.iter().cloned().collect();
        node
    }

    /// Copy of this node without its subtree.
    pub fn without_children(&self) -> Self {
        Self {
            coordinate: self.coordinate.clone(),
            type_: self.type_.clone(),
            scope: self.scope,
            exclusions: self.exclusions.clone(),
            children: Vec::new(),
            duplicate: self.duplicate,
        }
    }

    fn excludes(&self, dependency: &RawDependency) -> bool {
        self.exclusions
            .iter()
            .any(|e| e.matches(&dependency.group_id, &dependency.artifact_id))
    }
}

impl PartialEq for EffectiveDependency {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate
    }
}

impl Eq for EffectiveDependency {}

impl Hash for EffectiveDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinate.hash(state);
    }
}

/// Result of resolving one root manifest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyGraph {
    pub roots: Vec<EffectiveDependency>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<ResolveError>,
}

pub(crate) fn serialize_errors<S: Serializer>(
    errors: &[ResolveError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(ToString::to_string))
}

/// Depth-first walk over the dependencies of one root manifest.
///
/// A builder is single use: its "seen" set spans the whole walk so that each coordinate
/// is expanded exactly once.
pub struct GraphBuilder<'a> {
    cache: &'a ManifestCache,
    root: &'a EffectiveManifest,
    versions: VersionResolver<'a>,
    seen: HashSet<Coordinate>,
    unavailable: HashSet<Coordinate>,
    errors: Vec<ResolveError>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(cache: &'a ManifestCache, root: &'a EffectiveManifest) -> Self {
        Self {
            cache,
            root,
            versions: VersionResolver::new(cache),
            seen: HashSet::new(),
            unavailable: HashSet::new(),
            errors: Vec::new(),
        }
    }

    pub fn build(mut self) -> DependencyGraph {
        let properties = PropertyResolver::new(self.cache);
        let root = self.root;

        let mut roots = Vec::new();
        for dependency in root.dependencies() {
            let scope = match dependency.scope.as_deref().map(str::parse::<Scope>) {
                None => Scope::Compile,
                Some(Ok(scope)) => scope,
                Some(Err(err)) => {
                    tracing::warn!(
                        target: "pomtree.resolve",
                        dependency = %format!("{}:{}", dependency.group_id, dependency.artifact_id),
                        error = %err,
                        "skipping dependency with unknown scope"
                    );
                    continue;
                }
            };

            let version = match dependency.version.as_deref() {
                Some(declared) => {
                    let version = properties.resolve(declared, root);
                    if is_placeholder(&version) {
                        self.record(ResolveError::UnresolvableVersion {
                            group_id: dependency.group_id.clone(),
                            artifact_id: dependency.artifact_id.clone(),
                            declared_in: root.coordinate().clone(),
                        });
                        continue;
                    }
                    version
                }
                None => match self.versions.resolve(dependency, root, root) {
                    Ok(version) => version,
                    Err(err) => {
                        self.record(err);
                        continue;
                    }
                },
            };

            let node = EffectiveDependency::from_declaration(dependency, version, scope);
            if self.seen.insert(node.coordinate.clone()) {
                roots.push(node);
            } else {
                tracing::debug!(
                    target: "pomtree.resolve",
                    coordinate = %node.coordinate,
                    "ignoring repeated root dependency"
                );
            }
        }

        roots.retain_mut(|node| self.expand(node));
        if !self.unavailable.is_empty() {
            prune_unavailable(&mut roots, &self.unavailable);
        }

        DependencyGraph {
            roots,
            errors: self.errors,
        }
    }

    /// Populates `node.children` and walks into every child not seen before.
    ///
    /// Returns `false` when the node's own manifest is unavailable; the caller drops it.
    fn expand(&mut self, node: &mut EffectiveDependency) -> bool {
        if matches!(node.scope, Scope::System | Scope::Import) {
            return true;
        }
        let manifest = match self.cache.get(&node.coordinate) {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::warn!(
                    target: "pomtree.resolve",
                    coordinate = %node.coordinate,
                    error = %err,
                    "dropping dependency whose manifest is unavailable"
                );
                self.seen.remove(&node.coordinate);
                self.unavailable.insert(node.coordinate.clone());
                self.record(err);
                return false;
            }
        };

        let mut children: Vec<EffectiveDependency> = Vec::new();
        for candidate in manifest.dependencies() {
            if !matches!(candidate.packaging_type(), "jar" | "pom")
                || candidate.optional
                || node.excludes(candidate)
            {
                continue;
            }
            let declared = match candidate.scope.as_deref().map(str::parse::<Scope>) {
                None => None,
                Some(Ok(scope)) => Some(scope),
                Some(Err(err)) => {
                    tracing::warn!(
                        target: "pomtree.resolve",
                        coordinate = %manifest.coordinate(),
                        error = %err,
                        "skipping transitive dependency with unknown scope"
                    );
                    continue;
                }
            };
            let Some(scope) = effective_scope(node.scope, declared) else {
                continue;
            };

            let version = match self.versions.resolve(candidate, self.root, &manifest) {
                Ok(version) => version,
                Err(err) => {
                    self.record(err);
                    continue;
                }
            };
            let child = EffectiveDependency::from_declaration(candidate, version, scope);
            if !children.contains(&child) {
                children.push(child);
            }
        }

        // Siblings are discovered together, before any of them is walked.
        for child in &mut children {
            if !self.seen.insert(child.coordinate.clone()) {
                child.duplicate = true;
            }
        }
        children.retain_mut(|child| child.duplicate || self.expand(child));

        node.children = children;
        true
    }

    fn record(&mut self, err: ResolveError) {
        if !self.errors.contains(&err) {
            self.errors.push(err);
        }
    }
}

/// Drops duplicate markers left behind for coordinates whose manifest failed to load
/// after the marker was placed.
fn prune_unavailable(nodes: &mut Vec<EffectiveDependency>, unavailable: &HashSet<Coordinate>) {
    nodes.retain(|node| !unavailable.contains(&node.coordinate));
    for node in nodes {
        prune_unavailable(&mut node.children, unavailable);
    }
}
