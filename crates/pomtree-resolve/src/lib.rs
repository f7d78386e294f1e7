//! Dependency resolution for POM manifests.
//!
//! The engine turns a root manifest into its effective transitive dependency tree:
//! - [`EffectiveManifest`] merges a manifest with its active profiles (and, for reactor
//!   modules, the aggregator);
//! - [`ManifestCache`] fetches and parses every coordinate at most once per run family;
//! - [`VersionResolver`] picks versions from dependency management, the parent chain and
//!   imported BOMs;
//! - [`GraphBuilder`] walks dependencies depth first, applying the scope table,
//!   exclusions and duplicate detection;
//! - [`flatten()`] collapses a tree into a set.
//!
//! [`Resolver`] ties these together for manifest files on disk.

mod activation;
mod cache;
mod effective;
mod error;
mod flatten;
mod graph;
mod modules;
mod properties;
mod scope;
mod version_range;
mod versions;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexSet;
use pomtree_pom::{parse_manifest, ManifestSource};
use serde::Serialize;

pub use activation::{normalize_jdk_range, ActivationContext};
pub use cache::ManifestCache;
pub use effective::EffectiveManifest;
pub use error::{LoadError, ResolveError};
pub use flatten::flatten;
pub use graph::{DependencyGraph, EffectiveDependency, GraphBuilder};
pub use modules::{discover_modules, ModuleManifest};
pub use properties::PropertyResolver;
pub use scope::{effective_scope, Scope, UnknownScope};
pub use version_range::{ArtifactVersion, InvalidVersionRange, VersionRange};
pub use versions::VersionResolver;

/// Flattened dependency set of one module.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlatDependencies {
    pub dependencies: IndexSet<EffectiveDependency>,
    #[serde(serialize_with = "graph::serialize_errors")]
    pub errors: Vec<ResolveError>,
}

impl From<DependencyGraph> for FlatDependencies {
    fn from(graph: DependencyGraph) -> Self {
        Self {
            dependencies: flatten(&graph.roots),
            errors: graph.errors,
        }
    }
}

/// Entry point for resolving manifests that share one [`ManifestCache`].
#[derive(Debug)]
pub struct Resolver {
    cache: ManifestCache,
}

impl Resolver {
    pub fn new(source: Arc<dyn ManifestSource>, context: ActivationContext) -> Self {
        Self {
            cache: ManifestCache::new(source, context),
        }
    }

    pub fn cache(&self) -> &ManifestCache {
        &self.cache
    }

    pub fn context(&self) -> &ActivationContext {
        self.cache.context()
    }

    /// Reads and parses a manifest file and registers it in the cache.
    pub fn load_path(&self, path: &Path) -> Result<Arc<EffectiveManifest>, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&bytes, path.display().to_string())
    }

    fn load(&self, bytes: &[u8], origin: String) -> Result<Arc<EffectiveManifest>, LoadError> {
        let raw = parse_manifest(bytes).map_err(|source| LoadError::Parse { origin, source })?;
        let manifest = Arc::new(EffectiveManifest::new(
            Arc::new(raw),
            None,
            self.cache.context(),
        ));
        self.cache.insert(Arc::clone(&manifest));
        Ok(manifest)
    }

    /// Dependency tree of an already loaded manifest.
    pub fn resolve_manifest(&self, root: &EffectiveManifest) -> DependencyGraph {
        let graph = GraphBuilder::new(&self.cache, root).build();
        tracing::info!(
            target: "pomtree.resolve",
            coordinate = %root.coordinate(),
            roots = graph.roots.len(),
            errors = graph.errors.len(),
            "resolved dependency graph"
        );
        graph
    }

    pub fn resolve_path(&self, path: &Path) -> Result<DependencyGraph, LoadError> {
        let root = self.load_path(path)?;
        Ok(self.resolve_manifest(&root))
    }

    pub fn resolve_bytes(&self, bytes: &[u8]) -> Result<DependencyGraph, LoadError> {
        let root = self.load(bytes, "<manifest bytes>".to_string())?;
        Ok(self.resolve_manifest(&root))
    }

    pub fn flatten_path(&self, path: &Path) -> Result<FlatDependencies, LoadError> {
        self.resolve_path(path).map(FlatDependencies::from)
    }

    /// Dependency tree of every module below the aggregator at `path`.
    pub fn resolve_modules(
        &self,
        path: &Path,
    ) -> Result<BTreeMap<String, DependencyGraph>, LoadError> {
        let aggregator = self.load_path(path)?;
        Ok(discover_modules(&self.cache, path, aggregator)
            .into_iter()
            .map(|module| {
                let graph = self.resolve_manifest(&module.manifest);
                (module.name, graph)
            })
            .collect())
    }

    pub fn flatten_modules(
        &self,
        path: &Path,
    ) -> Result<BTreeMap<String, FlatDependencies>, LoadError> {
        Ok(self
            .resolve_modules(path)?
            .into_iter()
            .map(|(name, graph)| (name, FlatDependencies::from(graph)))
            .collect())
    }
}
