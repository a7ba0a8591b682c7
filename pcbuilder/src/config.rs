//! Settings file support.
//!
//! Settings live in a JSON file (`pcbuilder.json` by default). Every field is
//! optional; missing fields fall back to [`Settings::default`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SETTINGS_FILENAME: &str = "pcbuilder.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Load the sample catalog when the component table is empty.
    pub seed_sample_data: bool,
    /// Stock count below which the inventory report lists a component.
    pub low_stock_threshold: u32,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("pc_configurator.db"),
            seed_sample_data: false,
            low_stock_threshold: 5,
            log_filter: "warn".to_string(),
        }
    }
}

/// Load settings from an explicit path. Errors if the file is missing or invalid.
pub fn load_settings_from_path(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `pcbuilder.json` from `dir` if it exists.
pub fn discover_settings(dir: &Path) -> Result<Option<Settings>, SettingsError> {
    let path = dir.join(SETTINGS_FILENAME);
    if !path.is_file() {
        return Ok(None);
    }
    tracing::debug!(path = %path.display(), "settings file found");
    load_settings_from_path(&path).map(Some)
}
