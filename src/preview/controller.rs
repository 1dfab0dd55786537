//! Camera stream lifecycle controller
//!
//! Turns a rapidly changing on/off request into correctly ordered
//! acquire/release calls. At most one handle is bound at a time, and every
//! handle a source produces is either bound to the newest request or
//! released straight away.
//!
//! Acquisitions cannot be aborted, so a request that is overtaken by a later
//! one keeps running; its token is then stale and whatever it yields is
//! handed back to the source on arrival.

use futures_util::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::error::{AcquisitionError, Error, Result};
use crate::media::{MediaConstraints, MediaSource, StreamHandle};
use crate::preview::binding::StateObserver;
use crate::preview::state::{AcquisitionToken, ControllerState, DesiredState, PreviewStatus};

/// Mutable controller state, guarded by a single lock
struct Core<O> {
    state: ControllerState,
    desired: DesiredState,
    last_token: Option<AcquisitionToken>,
    pending: usize,
    destroyed: bool,
    observer: O,
}

/// State shared with in-flight acquisition tasks
struct Shared<O> {
    core: Mutex<Core<O>>,
    source: Arc<dyn MediaSource>,
    constraints: MediaConstraints,
    status_tx: watch::Sender<PreviewStatus>,
    pending_tx: watch::Sender<usize>,
    runtime: Handle,
}

/// Text of a panic payload raised by a source
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "acquisition panicked".to_string()
    }
}

impl<O: StateObserver> Shared<O> {
    /// Move to `next`, notify, then release whatever was bound before
    fn enter(&self, core: &mut Core<O>, next: ControllerState) {
        let previous = std::mem::replace(&mut core.state, next);
        core.observer.on_state_changed(&core.state);
        self.status_tx.send_replace(core.state.status());

        if let ControllerState::Bound(handle) = previous {
            tracing::info!(handle = %handle.id(), source = self.source.name(), "Releasing camera");
            self.source.release(handle);
        }
    }

    fn apply(self: &Arc<Self>, core: &mut Core<O>, desired: DesiredState) {
        if core.destroyed {
            tracing::warn!(?desired, "Ignoring request on destroyed preview");
            return;
        }
        core.desired = desired;

        match desired {
            // Already live or on its way
            DesiredState::Active => {
                if matches!(core.state, ControllerState::Idle | ControllerState::Failed(_)) {
                    self.start_acquisition(core);
                }
            }
            DesiredState::Inactive => match core.state {
                ControllerState::Bound(_) => self.enter(core, ControllerState::Idle),
                ControllerState::Acquiring(token) => {
                    tracing::debug!(token = %token, "Superseding in-flight acquisition");
                    self.enter(core, ControllerState::Idle);
                }
                ControllerState::Idle | ControllerState::Failed(_) => {}
            },
        }
    }

    fn start_acquisition(self: &Arc<Self>, core: &mut Core<O>) {
        let token = AcquisitionToken::after(core.last_token);
        core.last_token = Some(token);
        core.pending += 1;
        self.pending_tx.send_replace(core.pending);

        tracing::debug!(token = %token, source = self.source.name(), "Acquiring camera");
        self.enter(core, ControllerState::Acquiring(token));

        let acquisition = self.source.acquire(&self.constraints);
        let shared = Arc::clone(self);
        self.runtime.spawn(async move {
            // A panicking source still has to settle its token
            let result = match AssertUnwindSafe(acquisition).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(token = %token, "Camera source panicked: {}", message);
                    Err(AcquisitionError::Unknown(message))
                }
            };
            shared.complete(token, result);
        });
    }

    fn complete(
        &self,
        token: AcquisitionToken,
        result: std::result::Result<StreamHandle, AcquisitionError>,
    ) {
        let mut core = self.core.lock();
        core.pending = core.pending.saturating_sub(1);
        self.pending_tx.send_replace(core.pending);

        let current = !core.destroyed
            && core.desired == DesiredState::Active
            && matches!(core.state, ControllerState::Acquiring(t) if t == token);

        match result {
            Ok(handle) if current => {
                tracing::info!(token = %token, handle = %handle.id(), "Camera bound: {}", handle);
                self.enter(&mut core, ControllerState::Bound(handle));
            }
            Ok(handle) => {
                tracing::debug!(token = %token, handle = %handle.id(), "Releasing stale acquisition");
                self.source.release(handle);
            }
            Err(reason) if current => {
                tracing::warn!(token = %token, error = %reason, "Camera acquisition failed");
                self.enter(&mut core, ControllerState::Failed(reason));
            }
            Err(reason) => {
                tracing::debug!(token = %token, error = %reason, "Discarding stale acquisition failure");
            }
        }
    }
}

/// Owner of at most one live camera stream.
///
/// Create one when the preview appears and drop it (or call
/// [`destroy`](Self::destroy)) when it goes away; any held stream is
/// released synchronously and any in-flight one as soon as it lands.
pub struct StreamController<O: StateObserver> {
    shared: Arc<Shared<O>>,
}

impl<O: StateObserver> StreamController<O> {
    /// Create a controller on the current tokio runtime
    pub fn new(
        source: Arc<dyn MediaSource>,
        observer: O,
        constraints: MediaConstraints,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;
        Ok(Self::with_runtime(runtime, source, observer, constraints))
    }

    /// Create a controller that spawns acquisitions on `runtime`
    pub fn with_runtime(
        runtime: Handle,
        source: Arc<dyn MediaSource>,
        observer: O,
        constraints: MediaConstraints,
    ) -> Self {
        let (status_tx, _) = watch::channel(PreviewStatus::Idle);
        let (pending_tx, _) = watch::channel(0);
        let core = Core {
            state: ControllerState::Idle,
            desired: DesiredState::Inactive,
            last_token: None,
            pending: 0,
            destroyed: false,
            observer,
        };

        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(core),
                source,
                constraints,
                status_tx,
                pending_tx,
                runtime,
            }),
        }
    }

    /// Request the camera on or off
    pub fn set_desired(&self, desired: DesiredState) {
        let mut core = self.shared.core.lock();
        self.shared.apply(&mut core, desired);
    }

    /// Flip the current request, as a single start/stop button does
    pub fn toggle(&self) {
        let mut core = self.shared.core.lock();
        let next = core.desired.toggled();
        self.shared.apply(&mut core, next);
    }

    pub fn desired(&self) -> DesiredState {
        self.shared.core.lock().desired
    }

    pub fn status(&self) -> PreviewStatus {
        self.shared.core.lock().state.status()
    }

    /// Token of the newest activation, if any was made
    pub fn last_token(&self) -> Option<AcquisitionToken> {
        self.shared.core.lock().last_token
    }

    /// Watch status changes
    pub fn subscribe(&self) -> watch::Receiver<PreviewStatus> {
        self.shared.status_tx.subscribe()
    }

    /// Acquisitions started but not yet completed, stale ones included
    pub fn pending_acquisitions(&self) -> usize {
        self.shared.core.lock().pending
    }

    /// Resolves once no acquisition is in flight
    pub async fn settled(&self) {
        let mut pending = self.shared.pending_tx.subscribe();
        let _ = pending.wait_for(|n| *n == 0).await;
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.core.lock().destroyed
    }

    /// Read the observer.
    ///
    /// `f` runs under the controller lock, which is not reentrant: calling
    /// back into this controller from `f` deadlocks.
    pub fn observe<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        f(&self.shared.core.lock().observer)
    }

    /// Forward a capture request to the observer's callback.
    ///
    /// Only honoured while a stream is bound; returns whether the callback
    /// ran. The callback runs outside the controller lock.
    pub fn request_capture(&self) -> bool {
        let callback = {
            let core = self.shared.core.lock();
            if !core.state.is_bound() {
                tracing::debug!("Capture requested without a live stream");
                return false;
            }
            core.observer.capture_callback()
        };

        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Tear down: release a bound stream now and make any in-flight
    /// acquisition release itself when it completes. Idempotent.
    pub fn destroy(&self) {
        let mut core = self.shared.core.lock();
        if core.destroyed {
            return;
        }
        core.destroyed = true;
        core.desired = DesiredState::Inactive;

        if !matches!(core.state, ControllerState::Idle) {
            self.shared.enter(&mut core, ControllerState::Idle);
        }
        tracing::debug!(pending = core.pending, "Preview destroyed");
    }
}

impl<O: StateObserver> Drop for StreamController<O> {
    fn drop(&mut self) {
        self.destroy();
    }
}
