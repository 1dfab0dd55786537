//! Controller states and the status projected to the UI

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::error::AcquisitionError;
use crate::media::StreamHandle;

/// What the UI toggle is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DesiredState {
    Active,
    #[default]
    Inactive,
}

impl DesiredState {
    /// The opposite request, for a single toggle button
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

/// Sequence number of an activation request.
///
/// Only the most recently minted token may bind a stream; completions
/// carrying any older token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AcquisitionToken(u64);

impl AcquisitionToken {
    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn after(previous: Option<Self>) -> Self {
        Self(previous.map_or(1, |t| t.0 + 1))
    }
}

impl fmt::Display for AcquisitionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a [`StreamController`](super::StreamController)
#[derive(Debug)]
pub enum ControllerState {
    /// No stream, nothing in flight
    Idle,
    /// Waiting on the acquisition started for this token
    Acquiring(AcquisitionToken),
    /// A live stream is held and shown
    Bound(StreamHandle),
    /// The last acquisition failed; waits for a fresh activation
    Failed(AcquisitionError),
}

impl ControllerState {
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// The live stream, while bound
    pub fn handle(&self) -> Option<&StreamHandle> {
        match self {
            Self::Bound(handle) => Some(handle),
            _ => None,
        }
    }

    /// Project onto the handle-free status shown to the UI
    pub fn status(&self) -> PreviewStatus {
        match self {
            Self::Idle => PreviewStatus::Idle,
            Self::Acquiring(_) => PreviewStatus::Connecting,
            Self::Bound(handle) => PreviewStatus::Live {
                handle_id: handle.id(),
                label: handle.label().to_string(),
                width: handle.width(),
                height: handle.height(),
                opened_at: handle.opened_at(),
            },
            Self::Failed(reason) => PreviewStatus::Error {
                message: reason.to_string(),
            },
        }
    }
}

/// What the surrounding UI displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PreviewStatus {
    #[default]
    Idle,
    Connecting,
    Live {
        handle_id: Uuid,
        label: String,
        width: u32,
        height: u32,
        opened_at: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

impl PreviewStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }

    pub fn error_text(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let first = AcquisitionToken::after(None);
        let second = AcquisitionToken::after(Some(first));
        assert_eq!(first.value(), 1);
        assert!(second > first);
    }

    #[test]
    fn test_status_projection() {
        let handle = StreamHandle::new("cam", 640, 480);
        let id = handle.id();
        let opened_at = handle.opened_at();

        assert_eq!(ControllerState::Idle.status(), PreviewStatus::Idle);
        let bound = ControllerState::Bound(handle);
        assert_eq!(bound.handle().map(|h| h.id()), Some(id));
        assert!(matches!(
            bound.status(),
            PreviewStatus::Live { opened_at: at, .. } if at == opened_at
        ));
        assert!(ControllerState::Idle.handle().is_none());
        assert_eq!(
            ControllerState::Failed(AcquisitionError::PermissionDenied)
                .status()
                .error_text(),
            Some("Camera access denied")
        );

        let json = serde_json::to_value(PreviewStatus::Live {
            handle_id: id,
            label: "cam".into(),
            width: 640,
            height: 480,
            opened_at,
        })
        .unwrap();
        assert_eq!(json["state"], "live");
        assert_eq!(json["width"], 640);
        assert_eq!(json["opened_at"], serde_json::to_value(opened_at).unwrap());
    }

    #[test]
    fn test_toggle() {
        assert_eq!(DesiredState::Inactive.toggled(), DesiredState::Active);
        assert_eq!(DesiredState::Active.toggled(), DesiredState::Inactive);
    }
}
