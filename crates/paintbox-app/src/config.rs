//! Application configuration.

use crate::error::{AppError, AppResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "PAINTBOX_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    /// Where the canvas starts inside the host, in device pixels.
    pub origin: Point,
    /// Directory relative background references resolve against.
    pub asset_root: PathBuf,
    /// Directory exports are written to.
    pub output_dir: PathBuf,
    /// Logo stamped onto exports.
    pub watermark: Option<PathBuf>,
    /// Page query string, e.g. `?image=forest.png`.
    pub initial_query: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            origin: Point::ZERO,
            asset_root: PathBuf::from("assets"),
            output_dir: PathBuf::from("exports"),
            watermark: None,
            initial_query: None,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str, path: &Path) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|source| AppError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json, path)
    }

    /// Load from `path`, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_json_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Asset root as an absolute path, so it can be turned into a base URL.
    pub fn resolved_asset_root(&self) -> PathBuf {
        std::path::absolute(&self.asset_root).unwrap_or_else(|_| self.asset_root.clone())
    }
}
