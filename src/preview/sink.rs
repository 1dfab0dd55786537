//! Rendering surface the preview draws into

use uuid::Uuid;

use crate::media::StreamHandle;

/// A surface that can show a live stream.
///
/// A sink only observes the handle it is given; it never owns or releases
/// it, and must stop referencing it when `unbind_source` is called.
///
/// Both methods are called with the controller lock held, which is not
/// reentrant. Calling back into the controller from a sink deadlocks.
pub trait RenderSink: Send + 'static {
    fn bind_source(&mut self, handle: &StreamHandle);
    fn unbind_source(&mut self);
}

/// Sink that only reports what it would display
#[derive(Debug, Default)]
pub struct LogSink {
    current: Option<Uuid>,
    binds: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session currently shown
    pub fn current(&self) -> Option<Uuid> {
        self.current
    }

    /// Number of times a source was attached
    pub fn binds(&self) -> u64 {
        self.binds
    }
}

impl RenderSink for LogSink {
    fn bind_source(&mut self, handle: &StreamHandle) {
        tracing::info!(handle = %handle.id(), "Preview showing {}", handle);
        self.current = Some(handle.id());
        self.binds += 1;
    }

    fn unbind_source(&mut self) {
        if let Some(id) = self.current.take() {
            tracing::info!(handle = %id, "Preview cleared");
        }
    }
}
