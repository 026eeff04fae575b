//! User settings, loaded from `~/.config/flight_focus/config.json`.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::session::DriverConfig;

pub const DEFAULT_WS_ADDR: &str = "127.0.0.1:8765";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Airport catalog in the `airports.json` format.
    pub airports_path: Option<PathBuf>,
    /// Where `daemon` listens for the browser UI.
    pub ws_addr: SocketAddr,
    /// Desktop notification on snack breaks.
    pub notifications: bool,
    /// Marker frames per second.
    pub animation_fps: u32,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            airports_path: None,
            ws_addr: SocketAddr::from(([127, 0, 0, 1], 8765)),
            notifications: true,
            animation_fps: 10,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("flight_focus")
            .join("config.json")
    }

    /// Reads `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.animation_fps = self.animation_fps.max(1);
        self
    }

    pub fn driver(&self) -> DriverConfig {
        DriverConfig::with_fps(self.animation_fps)
    }
}
