use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or an `EnvFilter` directive string.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// Configured directives; blank means `info` and `warning` is read as `warn`.
    ///
    /// Anything else is handed to `EnvFilter` untouched, which already accepts level
    /// names in any case as well as per-target directives.
    pub(crate) fn directives(&self) -> String {
        match self.level.trim() {
            "" => Self::default_level(),
            level if level.eq_ignore_ascii_case("warning") => "warn".to_owned(),
            level => level.to_owned(),
        }
    }

    /// Effective filter. `RUST_LOG` directives are appended to the configured ones; when
    /// the combination does not parse, `RUST_LOG` alone and then the configured level are
    /// tried before falling back to `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = self.directives();
        let from_env = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let mut candidates = Vec::with_capacity(3);
        if let Some(env) = from_env {
            candidates.push(format!("{configured},{env}"));
            candidates.push(env);
        }
        candidates.push(configured);

        candidates
            .into_iter()
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(Self::default_level()))
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global stderr subscriber. Only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(config.env_filter())
            .with_writer(std::io::stderr)
            .with_target(true);
        let result = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        if let Err(err) = result {
            eprintln!("pomtree: failed to install tracing subscriber: {err}");
        }
    });
}
