//! Version selection for dependencies declared without (or with a placeholder) version.

use std::collections::HashSet;
use std::sync::Arc;

use pomtree_pom::{Coordinate, RawDependency};

use crate::cache::ManifestCache;
use crate::effective::EffectiveManifest;
use crate::error::ResolveError;
use crate::properties::{is_placeholder, PropertyResolver};

#[derive(Clone, Copy)]
pub struct VersionResolver<'a> {
    cache: &'a ManifestCache,
    properties: PropertyResolver<'a>,
}

impl<'a> VersionResolver<'a> {
    pub fn new(cache: &'a ManifestCache) -> Self {
        Self {
            cache,
            properties: PropertyResolver::new(cache),
        }
    }

    /// Version of a transitive `dependency` declared in `owner`, found while resolving
    /// the graph of `root`.
    ///
    /// Sources, first hit wins:
    /// 1. management of `root` (see [`VersionResolver::managed_version`]);
    /// 2. management of `owner`;
    /// 3. the declared version, resolved against `root`, then against `owner`.
    pub fn resolve(
        &self,
        dependency: &RawDependency,
        root: &EffectiveManifest,
        owner: &EffectiveManifest,
    ) -> Result<String, ResolveError> {
        let (group_id, artifact_id) = (&dependency.group_id, &dependency.artifact_id);

        if let Some(version) = self.managed_version(group_id, artifact_id, root) {
            return Ok(version);
        }
        if owner.coordinate() != root.coordinate() {
            if let Some(version) = self.managed_version(group_id, artifact_id, owner) {
                return Ok(version);
            }
        }
        if let Some(declared) = dependency.version.as_deref() {
            let version = self.properties.resolve(declared, root);
            if !is_placeholder(&version) {
                return Ok(version);
            }
            let version = self.properties.resolve(declared, owner);
            if !is_placeholder(&version) {
                return Ok(version);
            }
        }

        Err(ResolveError::UnresolvableVersion {
            group_id: group_id.clone(),
            artifact_id: artifact_id.clone(),
            declared_in: owner.coordinate().clone(),
        })
    }

    /// Managed version of `group_id:artifact_id` as seen from `manifest`.
    ///
    /// Searches, in order: the manifest's own dependency management, its parent when the
    /// dependency *is* that parent, every ancestor's management, then the imported BOMs
    /// of the manifest and of its ancestors, each BOM searched the same way (depth first).
    pub fn managed_version(
        &self,
        group_id: &str,
        artifact_id: &str,
        manifest: &EffectiveManifest,
    ) -> Option<String> {
        let mut visited = HashSet::new();
        self.search(group_id, artifact_id, manifest, &mut visited)
    }

    fn search(
        &self,
        group_id: &str,
        artifact_id: &str,
        manifest: &EffectiveManifest,
        visited: &mut HashSet<Coordinate>,
    ) -> Option<String> {
        if !visited.insert(manifest.coordinate().clone()) {
            return None;
        }

        if let Some(version) = self.own_management(group_id, artifact_id, manifest) {
            return Some(version);
        }

        let ancestors = self.ancestors(manifest, visited);
        let mut child: &EffectiveManifest = manifest;
        for ancestor in &ancestors {
            if let Some(parent) = child.parent_ref().filter(|p| p.is(group_id, artifact_id)) {
                let version = self.properties.resolve(&parent.version, child);
                if !is_placeholder(&version) {
                    return Some(version);
                }
            }
            if let Some(version) = self.own_management(group_id, artifact_id, ancestor) {
                return Some(version);
            }
            child = &**ancestor;
        }
        // Tail of the chain: the last parent reference may itself be the dependency
        // even when its manifest could not be loaded.
        if let Some(parent) = child.parent_ref().filter(|p| p.is(group_id, artifact_id)) {
            let version = self.properties.resolve(&parent.version, child);
            if !is_placeholder(&version) {
                return Some(version);
            }
        }

        std::iter::once(manifest)
            .chain(ancestors.iter().map(Arc::as_ref))
            .find_map(|owner| self.search_boms(group_id, artifact_id, owner, visited))
    }

    fn own_management(
        &self,
        group_id: &str,
        artifact_id: &str,
        manifest: &EffectiveManifest,
    ) -> Option<String> {
        manifest
            .dependency_management()
            .iter()
            .filter(|managed| managed.is(group_id, artifact_id) && !managed.is_bom_import())
            .filter_map(|managed| managed.version.as_deref())
            .map(|version| self.properties.resolve(version, manifest))
            .find(|version| !is_placeholder(version))
    }

    fn search_boms(
        &self,
        group_id: &str,
        artifact_id: &str,
        owner: &EffectiveManifest,
        visited: &mut HashSet<Coordinate>,
    ) -> Option<String> {
        for import in owner.bom_imports() {
            let Some(version) = import
                .version
                .as_deref()
                .map(|v| self.properties.resolve(v, owner))
                .filter(|v| !is_placeholder(v))
            else {
                tracing::warn!(
                    target: "pomtree.resolve",
                    coordinate = %owner.coordinate(),
                    bom = %format!("{}:{}", import.group_id, import.artifact_id),
                    "skipping BOM import without a resolvable version"
                );
                continue;
            };
            let coordinate =
                Coordinate::new(import.group_id.clone(), import.artifact_id.clone(), version);
            let bom = match self.cache.get(&coordinate) {
                Ok(bom) => bom,
                Err(err) => {
                    tracing::warn!(
                        target: "pomtree.resolve",
                        coordinate = %coordinate,
                        error = %err,
                        "skipping unavailable BOM import"
                    );
                    continue;
                }
            };
            if let Some(version) = self.search(group_id, artifact_id, &bom, visited) {
                return Some(version);
            }
        }
        None
    }

    /// Loads the `<parent>` chain above `manifest`, stopping at the first unavailable or
    /// already visited ancestor.
    fn ancestors(
        &self,
        manifest: &EffectiveManifest,
        visited: &mut HashSet<Coordinate>,
    ) -> Vec<Arc<EffectiveManifest>> {
        let mut chain: Vec<Arc<EffectiveManifest>> = Vec::new();
        let mut next = manifest.parent_ref().cloned();
        while let Some(coordinate) = next.take() {
            if !visited.insert(coordinate.clone()) {
                break;
            }
            match self.cache.get(&coordinate) {
                Ok(parent) => {
                    next = parent.parent_ref().cloned();
                    chain.push(parent);
                }
                Err(err) => {
                    tracing::warn!(
                        target: "pomtree.resolve",
                        coordinate = %coordinate,
                        child = %manifest.coordinate(),
                        error = %err,
                        "parent manifest unavailable"
                    );
                }
            }
        }
        chain
    }
}
