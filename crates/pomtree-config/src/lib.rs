//! Configuration for pomtree: TOML config files, tracing setup, and discovery of the
//! local Maven repository and the JDK specification version.

mod jdk;
mod logging;
mod repository;

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::ReentrantMutex;
use pomtree_pom::{CompositeRepository, LocalRepository, ManifestSource, RemoteRepository};
use serde::{Deserialize, Serialize};

pub use jdk::{detect_jdk_version, parse_release_file, spec_version_from_settings, DEFAULT_JDK};
pub use logging::{init_tracing, LoggingConfig};
pub use repository::{discover_local_repository, local_repository_from_settings};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PomtreeConfig {
    pub resolve: ResolveConfig,
    pub repository: RepositoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveConfig {
    /// Java specification version used for profile activation; detected when unset.
    pub jdk: Option<String>,
    /// Profiles activated by id.
    pub profiles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Local repository directory; discovered from `settings.xml` / `~/.m2` when unset.
    pub local: Option<PathBuf>,
    pub remote: String,
    /// Never contact the remote repository.
    pub offline: bool,
    pub timeout_ms: u64,
}

impl RepositoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            local: None,
            remote: pomtree_pom::DEFAULT_REMOTE_URL.to_string(),
            offline: false,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.message().to_string())
    }
}

impl PomtreeConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Configured JDK version, or the one detected from the environment.
    pub fn jdk(&self) -> String {
        self.resolve.jdk.clone().unwrap_or_else(detect_jdk_version)
    }

    /// Configured local repository, or the discovered one.
    pub fn local_repository(&self) -> PathBuf {
        self.repository
            .local
            .clone()
            .unwrap_or_else(discover_local_repository)
    }

    /// Reader chain for this configuration: the local repository, then (unless offline)
    /// the remote one.
    pub fn manifest_source(&self) -> Arc<dyn ManifestSource> {
        let local = LocalRepository::new(self.local_repository());
        if self.repository.offline {
            return Arc::new(local);
        }
        let remote = RemoteRepository::new(&self.repository.remote, self.repository.timeout());
        Arc::new(CompositeRepository::local_then_remote(local, remote))
    }
}

pub const POMTREE_CONFIG_ENV_VAR: &str = "POMTREE_CONFIG_PATH";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Run `f` while holding the config environment lock.
///
/// Tests that set [`POMTREE_CONFIG_ENV_VAR`] or the variables used by JDK and repository
/// discovery must hold this lock so concurrent discovery never sees a half-applied
/// environment.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Config file for a project directory.
///
/// Search order:
/// 1) `POMTREE_CONFIG_PATH` (absolute or relative to `project_root`)
/// 2) `pomtree.toml` in `project_root`
/// 3) `.pomtree.toml` in `project_root`
pub fn discover_config_path(project_root: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(POMTREE_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            project_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["pomtree.toml", ".pomtree.toml"]
        .into_iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Loads the configuration for a project directory, or defaults when there is none.
pub fn load_for_project(
    project_root: &Path,
) -> Result<(PomtreeConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(project_root) else {
        return Ok((PomtreeConfig::default(), None));
    };
    let config = PomtreeConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}
