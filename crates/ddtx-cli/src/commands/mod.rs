//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod output;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use ddtx_core::DdtxConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ddtx")
        .join("config.json")
}

/// Load the configuration from `-c`, else from the default location if it
/// exists, else the built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DdtxConfig> {
    if let Some(path) = config_path {
        debug!("Loading configuration from {}", path);
        return Ok(DdtxConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        return Ok(DdtxConfig::from_file(&default_path)?);
    }

    Ok(DdtxConfig::default())
}
