//! View configuration.
//!
//! Styling and pipeline settings live in one JSON document, normally
//! `.tradenet/config.json`. Every field is optional; missing ones take
//! their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tradenet_core::DEFAULT_TOP_K;
use tradenet_geo::MapStyle;
use tradenet_graph::{GraphStyle, LayoutKind, DEFAULT_SEED};

/// Directory holding TradeNet settings.
pub const CONFIG_DIR: &str = ".tradenet";

/// Settings file name inside `CONFIG_DIR`.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not access config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings applied to every computed view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    /// Number of partners to rank.
    pub top_k: usize,
    /// Layout used when a request names none.
    pub layout: LayoutKind,
    /// Seed for the spring layout.
    pub seed: u64,
    pub graph: GraphStyle,
    pub map: MapStyle,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            layout: LayoutKind::default(),
            seed: DEFAULT_SEED,
            graph: GraphStyle::default(),
            map: MapStyle::default(),
        }
    }
}

impl ViewConfig {
    /// Reads a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Loads `path` if given, else `.tradenet/config.json` under `root`
    /// when it exists, else the defaults.
    pub fn discover(path: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = root.join(CONFIG_DIR).join(CONFIG_FILE);
        if default_path.exists() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }
}
