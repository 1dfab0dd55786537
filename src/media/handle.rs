//! Live capture session handle

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Handle to a live camera capture session.
///
/// Deliberately not `Clone`: whoever holds the value owns the session, and
/// giving it back to [`MediaSource::release`](super::MediaSource::release)
/// consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct StreamHandle {
    id: Uuid,
    label: String,
    width: u32,
    height: u32,
    opened_at: DateTime<Utc>,
}

impl StreamHandle {
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            width,
            height,
            opened_at: Utc::now(),
        }
    }

    /// Unique session id
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Device label reported by the source
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Negotiated frame width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Negotiated frame height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// When the source opened the session
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{}, {})", self.label, self.width, self.height, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_distinct() {
        let a = StreamHandle::new("cam", 640, 480);
        let b = StreamHandle::new("cam", 640, 480);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.label(), "cam");
        assert_eq!((a.width(), a.height()), (640, 480));
    }
}
