//! Capability request sent with every acquisition

use serde::{Deserialize, Serialize};

use crate::constants::{PREVIEW_HEIGHT, PREVIEW_WIDTH};

/// Which way the requested camera should face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Towards the user (selfie camera)
    #[default]
    User,
    /// Away from the user
    Environment,
}

/// Constraints passed to [`MediaSource::acquire`](super::MediaSource::acquire).
///
/// Resolution and facing mode are hints; a source may negotiate something
/// else and reports what it actually got on the returned handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConstraints {
    pub video: bool,
    pub audio: bool,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
}

impl MediaConstraints {
    /// The fixed preview request: video only, 640x480, user-facing
    pub fn preview() -> Self {
        Self {
            video: true,
            audio: false,
            ideal_width: PREVIEW_WIDTH,
            ideal_height: PREVIEW_HEIGHT,
            facing_mode: FacingMode::User,
        }
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self::preview()
    }
}
