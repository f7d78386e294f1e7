use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use pomtree_pom::{parse_manifest, Coordinate, ManifestSource};

use crate::activation::ActivationContext;
use crate::effective::EffectiveManifest;
use crate::error::ResolveError;

type Entry = Arc<OnceLock<Result<Arc<EffectiveManifest>, ResolveError>>>;

/// Coordinate-keyed memo of effective manifests for one family of resolution runs.
///
/// Each coordinate is fetched and parsed at most once, failures included. Concurrent
/// callers asking for the same coordinate block on the single in-flight load.
pub struct ManifestCache {
    source: Arc<dyn ManifestSource>,
    context: ActivationContext,
    entries: Mutex<HashMap<Coordinate, Entry>>,
}

impl std::fmt::Debug for ManifestCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestCache")
            .field("context", &self.context)
            .field("entries", &self.entries.lock().len())
            .finish_non_exhaustive()
    }
}

impl ManifestCache {
    pub fn new(source: Arc<dyn ManifestSource>, context: ActivationContext) -> Self {
        Self {
            source,
            context,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &ActivationContext {
        &self.context
    }

    pub fn get(&self, coordinate: &Coordinate) -> Result<Arc<EffectiveManifest>, ResolveError> {
        // The map lock only guards slot creation; the load itself runs under the slot's
        // `OnceLock` so unrelated coordinates never wait on each other.
        let slot = Arc::clone(self.entries.lock().entry(coordinate.clone()).or_default());

        let mut loaded = false;
        let result = slot.get_or_init(|| {
            loaded = true;
            self.load(coordinate)
        });
        if !loaded {
            tracing::trace!(target: "pomtree.resolve", %coordinate, "manifest cache hit");
        }
        result.clone()
    }

    /// Registers a manifest built outside the cache (reactor modules, the root file).
    ///
    /// Returns `false` when the coordinate already had an entry; the existing entry wins.
    pub fn insert(&self, manifest: Arc<EffectiveManifest>) -> bool {
        let slot = Arc::clone(
            self.entries
                .lock()
                .entry(manifest.coordinate().clone())
                .or_default(),
        );
        slot.set(Ok(manifest)).is_ok()
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.entries
            .lock()
            .get(coordinate)
            .is_some_and(|slot| slot.get().is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self, coordinate: &Coordinate) -> Result<Arc<EffectiveManifest>, ResolveError> {
        tracing::debug!(target: "pomtree.resolve", %coordinate, "fetching manifest");
        let bytes = match self.source.read(coordinate) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                return Err(ResolveError::NotFound {
                    coordinate: coordinate.clone(),
                })
            }
            Err(source) => {
                return Err(ResolveError::Repository {
                    coordinate: coordinate.clone(),
                    source,
                })
            }
        };
        let raw = parse_manifest(&bytes).map_err(|source| ResolveError::Parse {
            coordinate: coordinate.clone(),
            source,
        })?;
        Ok(Arc::new(EffectiveManifest::new(
            Arc::new(raw),
            None,
            &self.context,
        )))
    }
}
