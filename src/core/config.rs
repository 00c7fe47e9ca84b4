//! Runtime configuration loaded from `plushy.toml` with environment overrides.

use crate::core::error::PlushyError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "plushy.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".plushy/data"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info,plushy=debug`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config, PlushyError> {
    toml::from_str(content).map_err(|e| PlushyError::ConfigError(e.to_string()))
}

/// Load configuration.
///
/// An explicit path must exist. Without one, `./plushy.toml` is used when
/// present and defaults otherwise. Environment overrides apply last.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, PlushyError> {
    let mut config = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|e| {
                PlushyError::ConfigError(format!("cannot read {}: {}", path.display(), e))
            })?;
            parse_config(&content)?
        }
        None => {
            let default_path = Path::new(CONFIG_FILE_NAME);
            if default_path.is_file() {
                let content = fs::read_to_string(default_path).map_err(PlushyError::IoError)?;
                parse_config(&content)?
            } else {
                Config::default()
            }
        }
    };
    apply_env_overrides(&mut config, |name| env::var(name).ok());
    Ok(config)
}

pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    if let Some(bind) = non_empty("PLUSHY_BIND") {
        config.server.bind = bind;
    }
    if let Some(dir) = non_empty("PLUSHY_DATA_DIR") {
        config.store.data_dir = PathBuf::from(dir);
    }
    if let Some(filter) = non_empty("PLUSHY_LOG") {
        config.log.filter = filter;
    }
}
