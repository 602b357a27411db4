//! Errors for the ambient layers (configuration, runtime setup)
//!
//! Program interpretation itself has no error channel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
