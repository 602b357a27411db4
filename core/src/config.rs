//! Configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. A TOML file: the explicit path if one is given (it must exist), else
//!    `forkjoin.toml` in the working directory if present
//! 3. Environment variables, `FORKJOIN_` prefix and `__` between sections
//!    (`FORKJOIN_RUNTIME__SPAWNER=tokio`, `FORKJOIN_LOG__FILTER=debug`)
//! 4. Builder overrides (CLI flags)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;
use crate::spawner::SpawnerKind;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "FORKJOIN_CONFIG_PATH";

const DEFAULT_CONFIG_FILE: &str = "forkjoin";
const ENV_PREFIX: &str = "FORKJOIN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Execution context for forked fibers
    #[serde(default)]
    pub spawner: SpawnerKind,

    /// Tokio worker threads (tokio spawner only; tokio's default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default sources with no overrides
    pub fn load() -> Result<Self, Error> {
        Self::builder().build()
    }

    fn validate(&self) -> Result<(), Error> {
        if self.runtime.worker_threads == Some(0) {
            return Err(Error::InvalidConfig(
                "runtime.worker_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/* ===================== Builder ===================== */

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    spawner: Option<SpawnerKind>,
    log_filter: Option<String>,
    use_env: bool,
}

impl ConfigBuilder {
    /// Read this file instead of searching for `forkjoin.toml`
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn spawner(mut self, spawner: Option<SpawnerKind>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn log_filter(mut self, filter: Option<String>) -> Self {
        self.log_filter = filter;
        self
    }

    /// Skip environment variables (file and overrides only)
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn build(self) -> Result<Config, Error> {
        let mut builder = config::Config::builder()
            .set_default("runtime.spawner", SpawnerKind::default().as_str())?
            .set_default("log.filter", default_log_filter())?;

        let explicit_path = match self.config_path {
            Some(path) => Some(path),
            None if self.use_env => std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            None => None,
        };

        builder = match explicit_path {
            Some(path) => builder.add_source(config::File::from(path.as_path()).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        if self.use_env {
            builder = builder.add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        if let Some(spawner) = self.spawner {
            builder = builder.set_override("runtime.spawner", spawner.as_str())?;
        }
        if let Some(filter) = self.log_filter {
            builder = builder.set_override("log.filter", filter)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            config_path: None,
            spawner: None,
            log_filter: None,
            use_env: true,
        }
    }
}

/// Serializes tests that read or write `FORKJOIN_*` variables
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
