//! Application configuration
//!
//! Stored as TOML in the platform config directory. Every field has a
//! default, so a partial or missing file is fine.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL, DEFAULT_SIMULATED_LATENCY_MS};
use crate::error::ConfigError;
use crate::media::{MediaConstraints, MediaSource, SimulatedFailure, SimulatedSource};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_level: String,
    pub camera: CameraConfig,
    pub source: SourceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            camera: CameraConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

/// Preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub constraints: MediaConstraints,
    /// Draw the face guide over the live preview
    pub show_guidance: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            constraints: MediaConstraints::preview(),
            show_guidance: true,
        }
    }
}

/// Which camera backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceBackend {
    #[default]
    Simulated,
    V4l2,
}

/// Camera source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub backend: SourceBackend,
    /// `/dev/videoN` index for the V4L2 backend
    pub device_index: u32,
    pub simulated_latency_ms: u64,
    pub simulated_failure: Option<SimulatedFailure>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: SourceBackend::default(),
            device_index: 0,
            simulated_latency_ms: DEFAULT_SIMULATED_LATENCY_MS,
            simulated_failure: None,
        }
    }
}

impl SourceConfig {
    /// Build the configured source
    pub fn build(&self) -> Arc<dyn MediaSource> {
        match self.backend {
            SourceBackend::Simulated => self.simulated(),
            #[cfg(all(target_os = "linux", feature = "v4l2"))]
            SourceBackend::V4l2 => Arc::new(crate::media::V4l2Source::new(self.device_index)),
            #[cfg(not(all(target_os = "linux", feature = "v4l2")))]
            SourceBackend::V4l2 => {
                tracing::warn!("V4L2 backend not available in this build, using simulated camera");
                self.simulated()
            }
        }
    }

    fn simulated(&self) -> Arc<dyn MediaSource> {
        let source = SimulatedSource::new(Duration::from_millis(self.simulated_latency_ms));
        source.set_failure(self.simulated_failure);
        Arc::new(source)
    }
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "camera-preview")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Parse from TOML text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Load from a file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Write to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_toml()?;
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, text)
        };
        write().map_err(|source| ConfigError::File {
            path: path.display().to_string(),
            source,
        })
    }
}
