//! Configuration System
//!
//! Layered configuration for tree builds and logging. Sources, lowest to highest
//! precedence: built-in defaults, the global config file, the workspace
//! `ftree.toml`, then `FTREE_*` environment variables (`__` separates nested
//! keys, e.g. `FTREE_BUILD__MAX_DEPTH=3`).

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::tree::builder::BuildConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the workspace-level config file
pub const WORKSPACE_CONFIG_FILE: &str = "ftree.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtreeConfig {
    /// Tree build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FtreeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in &self.build.ignore_names {
            if name.is_empty() {
                return Err(ConfigError::Invalid("Ignore names cannot be empty".into()));
            }
            if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
                return Err(ConfigError::Invalid(format!(
                    "Ignore name '{}' must be a single path component",
                    name
                )));
            }
        }
        self.logging.validate().map_err(ConfigError::Invalid)
    }
}

/// Loads [`FtreeConfig`] from files and the environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace root, layering every source
    pub fn load(workspace_root: &Path) -> Result<FtreeConfig, ConfigError> {
        let mut builder = builder_with_defaults()?;

        if let Some(global) = Self::global_config_path().filter(|p| p.exists()) {
            debug!(config_path = %global.display(), "Using global config");
            builder = builder.add_source(File::from(global).required(false));
        }

        let workspace = workspace_root.join(WORKSPACE_CONFIG_FILE);
        if workspace.exists() {
            debug!(config_path = %workspace.display(), "Using workspace config");
            builder = builder.add_source(File::from(workspace).required(false));
        }

        Self::finish(builder.add_source(env_source()))
    }

    /// Load configuration from a single file (plus defaults)
    pub fn load_from_file(path: &Path) -> Result<FtreeConfig, ConfigError> {
        let builder = builder_with_defaults()?.add_source(File::from(path.to_path_buf()));
        Self::finish(builder)
    }

    /// Global config file: $XDG_CONFIG_HOME/ftree/config.toml, falling back to
    /// ~/.config/ftree/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        let base = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
        };
        Some(base.join("ftree").join("config.toml"))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<FtreeConfig, ConfigError> {
        let config: FtreeConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?)
}

fn env_source() -> Environment {
    Environment::with_prefix("FTREE")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("build.ignore_names")
        .try_parsing(true)
}
