//! Error types for the camera preview

use serde::Serialize;
use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Reasons a camera acquisition attempt can fail.
///
/// The `Display` text is what the preview shows to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AcquisitionError {
    #[error("Camera access denied")]
    PermissionDenied,

    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Camera error: {0}")]
    Unknown(String),
}

impl AcquisitionError {
    /// Classify an OS-level error from a capture device
    pub fn from_io(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            std::io::ErrorKind::NotFound => Self::DeviceUnavailable(err.to_string()),
            _ => Self::from_raw_os(err),
        }
    }

    #[cfg(target_os = "linux")]
    fn from_raw_os(err: &std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(libc::EACCES) | Some(libc::EPERM) => Self::PermissionDenied,
            Some(libc::ENOENT) | Some(libc::ENODEV) | Some(libc::ENXIO) | Some(libc::EBUSY) => {
                Self::DeviceUnavailable(err.to_string())
            }
            _ => Self::Unknown(err.to_string()),
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn from_raw_os(err: &std::io::Error) -> Self {
        Self::Unknown(err.to_string())
    }
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
