//! Reactor (multi-module) discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pomtree_pom::parse_manifest;

use crate::cache::ManifestCache;
use crate::effective::EffectiveManifest;

/// A module of a reactor build.
#[derive(Debug, Clone)]
pub struct ModuleManifest {
    /// `/`-joined module path relative to the aggregator, or the artifactId for a
    /// manifest without modules.
    pub name: String,
    pub path: PathBuf,
    pub manifest: Arc<EffectiveManifest>,
}

/// Lists the modules below `aggregator` (loaded from `aggregator_path`), depth first in
/// declaration order.
///
/// Every module is built with its aggregator as parent context and registered in
/// `cache`. Modules that list modules of their own are returned too and then descended
/// into. A module whose manifest is missing or malformed is skipped with a warning.
/// An aggregator without modules is returned as the only module, named by its
/// artifactId.
pub fn discover_modules(
    cache: &ManifestCache,
    aggregator_path: &Path,
    aggregator: Arc<EffectiveManifest>,
) -> Vec<ModuleManifest> {
    if aggregator.modules().is_empty() {
        return vec![ModuleManifest {
            name: aggregator.coordinate().artifact_id.clone(),
            path: aggregator_path.to_path_buf(),
            manifest: aggregator,
        }];
    }

    let mut visited = HashSet::new();
    visited.insert(canonicalize_or_fallback(aggregator_path));
    let mut out = Vec::new();
    discover_recursive(cache, aggregator_path, &aggregator, "", &mut visited, &mut out);
    out
}

fn discover_recursive(
    cache: &ManifestCache,
    aggregator_path: &Path,
    aggregator: &EffectiveManifest,
    prefix: &str,
    visited: &mut HashSet<PathBuf>,
    out: &mut Vec<ModuleManifest>,
) {
    let base = aggregator_path.parent().unwrap_or_else(|| Path::new("."));
    for module in aggregator.modules() {
        let path = module_manifest_path(base, module);
        if !visited.insert(canonicalize_or_fallback(&path)) {
            continue;
        }
        let name = if prefix.is_empty() {
            module.trim_end_matches('/').to_string()
        } else {
            format!("{prefix}/{}", module.trim_end_matches('/'))
        };

        let raw = match std::fs::read(&path)
            .map_err(|err| err.to_string())
            .and_then(|bytes| parse_manifest(&bytes).map_err(|err| err.to_string()))
        {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(
                    target: "pomtree.resolve",
                    module = %name,
                    path = %path.display(),
                    %error,
                    "skipping unreadable module"
                );
                continue;
            }
        };

        let manifest = Arc::new(EffectiveManifest::new(
            Arc::new(raw),
            Some(aggregator),
            cache.context(),
        ));
        if !cache.insert(Arc::clone(&manifest)) {
            tracing::debug!(
                target: "pomtree.resolve",
                coordinate = %manifest.coordinate(),
                "module coordinate already cached"
            );
        }

        out.push(ModuleManifest {
            name: name.clone(),
            path: path.clone(),
            manifest: Arc::clone(&manifest),
        });
        if !manifest.modules().is_empty() {
            discover_recursive(cache, &path, &manifest, &name, visited, out);
        }
    }
}

/// `<module>` names a directory holding `pom.xml`, or the manifest file itself.
fn module_manifest_path(base: &Path, module: &str) -> PathBuf {
    let candidate = base.join(module);
    if candidate.extension().is_some_and(|ext| ext == "xml") {
        candidate
    } else {
        candidate.join("pom.xml")
    }
}

fn canonicalize_or_fallback(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
