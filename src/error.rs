//! Error types for tree construction, configuration and logging setup.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem errors raised while building or (de)serializing a tree
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Failed to resolve root {path:?}: {source}")]
    RootUnresolved {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Root is not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration and logging setup errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
