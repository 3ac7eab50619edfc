// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON at `<config dir>/depth-capture/config.json`. Missing keys
//! fall back to their defaults, so older files keep loading.

use crate::backends::session::{MockProfile, SessionBackendType};
use crate::constants::{APP_DIR_NAME, CONFIG_FILE_NAME, JPEG_QUALITY, SETTLE_INTERVAL};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session backend to capture from
    pub backend: SessionBackendType,
    /// Device layout emulated by the mock backend
    pub mock_profile: MockProfile,
    /// Recording directory for the replay backend
    pub replay_dir: Option<PathBuf>,
    /// JPEG quality for the color payload (1-100)
    pub jpeg_quality: u8,
    /// Wait after a session starts before pulling a frame
    pub settle_interval_ms: u64,
    /// Where the CLI writes captures (default: ~/Pictures/depth-capture)
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: SessionBackendType::default(),
            mock_profile: MockProfile::default(),
            replay_dir: None,
            jpeg_quality: JPEG_QUALITY,
            settle_interval_ms: SETTLE_INTERVAL.as_millis() as u64,
            output_dir: None,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, or defaults if there is none
    pub fn load_default() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), backend = %config.backend, "Loaded config");
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Directory captures are written to
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME)
        })
    }
}
