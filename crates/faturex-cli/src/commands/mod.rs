//! Command implementations.

pub mod config;
pub mod inspect;
pub mod run;

use std::path::{Path, PathBuf};

use faturex_core::models::config::FaturexConfig;

/// Default location of the configuration file.
pub(crate) fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("faturex")
        .join("config.json")
}

/// Load configuration from an explicit path, the default path, or defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<FaturexConfig> {
    if let Some(path) = config_path {
        return Ok(FaturexConfig::from_file(Path::new(path))?);
    }

    let default = default_config_path();
    if default.exists() {
        return Ok(FaturexConfig::from_file(&default)?);
    }
    Ok(FaturexConfig::default())
}
