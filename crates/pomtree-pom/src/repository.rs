//! Manifest readers: where the bytes of a coordinate's POM come from.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;

use crate::{Coordinate, RepositoryError};

pub const DEFAULT_REMOTE_URL: &str = "https://repo1.maven.org/maven2/";

/// Source of raw manifest bytes.
///
/// `Ok(None)` means "not in this repository"; `Err` is reserved for failures that
/// should be reported (unreadable file, transport error).
pub trait ManifestSource: Send + Sync {
    fn read(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError>;
}

/// A local repository directory (`~/.m2/repository` layout).
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.root.join(coordinate.manifest_path())
    }
}

impl ManifestSource for LocalRepository {
    fn read(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        let path = self.manifest_path(coordinate);
        if !path.is_file() {
            return Ok(None);
        }
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RepositoryError::Io {
                path,
                message: err.to_string(),
            }),
        }
    }
}

/// A remote HTTP repository (Maven Central layout).
#[derive(Clone)]
pub struct RemoteRepository {
    base_url: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for RemoteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRepository")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RemoteRepository {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { base_url, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn manifest_url(&self, coordinate: &Coordinate) -> String {
        format!("{}{}", self.base_url, coordinate.manifest_path())
    }
}

impl ManifestSource for RemoteRepository {
    fn read(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        let url = self.manifest_url(coordinate);
        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _response)) => {
                tracing::warn!(target: "pomtree.pom", %url, status = code, "remote repository returned non-success status");
                return Ok(None);
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(RepositoryError::Http {
                    url,
                    message: transport.to_string(),
                });
            }
        };

        if response.status() != 200 {
            tracing::warn!(target: "pomtree.pom", %url, status = response.status(), "remote repository returned non-200 status");
            return Ok(None);
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|err| RepositoryError::Http {
                url: url.clone(),
                message: err.to_string(),
            })?;
        tracing::debug!(target: "pomtree.pom", %url, bytes = bytes.len(), "fetched remote manifest");
        Ok(Some(bytes))
    }
}

/// Tries each reader in order; the first hit wins.
pub struct CompositeRepository {
    sources: Vec<Box<dyn ManifestSource>>,
}

impl CompositeRepository {
    pub fn new(sources: Vec<Box<dyn ManifestSource>>) -> Self {
        Self { sources }
    }

    /// Local directory first, then the remote repository.
    pub fn local_then_remote(local: LocalRepository, remote: RemoteRepository) -> Self {
        Self::new(vec![Box::new(local), Box::new(remote)])
    }
}

impl ManifestSource for CompositeRepository {
    fn read(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        let mut first_error = None;
        for source in &self.sources {
            match source.read(coordinate) {
                Ok(Some(bytes)) => return Ok(Some(bytes)),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(target: "pomtree.pom", coordinate = %coordinate, error = %err, "repository reader failed; trying next");
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

/// In-memory manifests, with a per-coordinate read counter.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    manifests: Mutex<HashMap<Coordinate, Vec<u8>>>,
    reads: Mutex<HashMap<Coordinate, usize>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, coordinate: Coordinate, contents: impl Into<Vec<u8>>) {
        self.manifests.lock().insert(coordinate, contents.into());
    }

    /// Builder-style [`MemoryRepository::insert`].
    pub fn with(self, coordinate: Coordinate, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(coordinate, contents);
        self
    }

    /// Number of times `coordinate` was requested, hits and misses alike.
    pub fn reads(&self, coordinate: &Coordinate) -> usize {
        self.reads.lock().get(coordinate).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.reads.lock().values().sum()
    }
}

impl ManifestSource for MemoryRepository {
    fn read(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        *self.reads.lock().entry(coordinate.clone()).or_default() += 1;
        Ok(self.manifests.lock().get(coordinate).cloned())
    }
}

impl<T: ManifestSource + ?Sized> ManifestSource for std::sync::Arc<T> {
    fn read(&self, coordinate: &Coordinate) -> Result<Option<Vec<u8>>, RepositoryError> {
        (**self).read(coordinate)
    }
}
