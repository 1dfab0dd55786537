//! Projects controller state onto a sink and a status line

use std::sync::Arc;
use uuid::Uuid;

use crate::preview::sink::RenderSink;
use crate::preview::state::{ControllerState, PreviewStatus};

/// Called when the user asks for a capture while a stream is live
pub type CaptureCallback = Arc<dyn Fn() + Send + Sync>;

/// Receives every state change of a [`StreamController`](super::StreamController).
///
/// Notifications arrive before a released handle is given back to its
/// source, so an observer can detach from it first.
///
/// Both methods run while the controller holds its lock. That lock is not
/// reentrant, so an observer must not call back into the controller from
/// here; doing so deadlocks. Defer such work to a task or channel.
pub trait StateObserver: Send + 'static {
    fn on_state_changed(&mut self, state: &ControllerState);

    /// Target for capture requests, if any
    fn capture_callback(&self) -> Option<CaptureCallback> {
        None
    }
}

/// Keeps a [`RenderSink`] in step with the controller.
///
/// Holds no resources itself: it attaches the sink to a bound handle,
/// detaches it on any other state, and remembers what to show.
pub struct PreviewBinding<K: RenderSink> {
    sink: K,
    bound: Option<Uuid>,
    status: PreviewStatus,
    show_guidance: bool,
    on_capture: Option<CaptureCallback>,
}

impl<K: RenderSink> PreviewBinding<K> {
    pub fn new(sink: K) -> Self {
        Self {
            sink,
            bound: None,
            status: PreviewStatus::Idle,
            show_guidance: true,
            on_capture: None,
        }
    }

    /// Forward capture requests to `callback` while live
    pub fn with_capture(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_capture = Some(Arc::new(callback));
        self
    }

    /// Whether to draw the face guide over a live preview
    pub fn with_guidance(mut self, show: bool) -> Self {
        self.show_guidance = show;
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn status(&self) -> &PreviewStatus {
        &self.status
    }

    /// Session the sink is currently attached to
    pub fn bound_source(&self) -> Option<Uuid> {
        self.bound
    }

    /// Text to show in place of the preview, if the last attempt failed
    pub fn error_text(&self) -> Option<&str> {
        self.status.error_text()
    }

    pub fn is_connecting(&self) -> bool {
        self.status == PreviewStatus::Connecting
    }

    /// The face guide is only drawn over a live, error-free preview
    pub fn show_guidance(&self) -> bool {
        self.show_guidance && self.status.is_live()
    }

    fn detach(&mut self) {
        if self.bound.take().is_some() {
            self.sink.unbind_source();
        }
    }
}

impl<K: RenderSink> StateObserver for PreviewBinding<K> {
    fn on_state_changed(&mut self, state: &ControllerState) {
        match state.handle() {
            Some(handle) => {
                if self.bound != Some(handle.id()) {
                    self.detach();
                    self.sink.bind_source(handle);
                    self.bound = Some(handle.id());
                }
            }
            None => self.detach(),
        }
        self.status = state.status();
    }

    fn capture_callback(&self) -> Option<CaptureCallback> {
        if self.status.is_live() {
            self.on_capture.clone()
        } else {
            None
        }
    }
}
