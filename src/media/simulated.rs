//! Software camera source
//!
//! Hands out handles after a configurable delay, or fails in a scripted
//! way. Keeps count of what is open so leaks are visible.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AcquisitionError;
use crate::media::{AcquireFuture, MediaConstraints, MediaSource, StreamHandle};

/// Failure the simulated source should report on acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulatedFailure {
    PermissionDenied,
    DeviceUnavailable,
}

impl From<SimulatedFailure> for AcquisitionError {
    fn from(failure: SimulatedFailure) -> Self {
        match failure {
            SimulatedFailure::PermissionDenied => AcquisitionError::PermissionDenied,
            SimulatedFailure::DeviceUnavailable => {
                AcquisitionError::DeviceUnavailable("simulated device busy".to_string())
            }
        }
    }
}

#[derive(Default)]
struct Ledger {
    open: HashSet<Uuid>,
}

/// Camera source backed by nothing but a timer
pub struct SimulatedSource {
    latency: Duration,
    failure: Arc<Mutex<Option<SimulatedFailure>>>,
    ledger: Arc<Mutex<Ledger>>,
    opened: Arc<AtomicU64>,
    released: AtomicU64,
}

impl SimulatedSource {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failure: Arc::new(Mutex::new(None)),
            ledger: Arc::new(Mutex::new(Ledger::default())),
            opened: Arc::new(AtomicU64::new(0)),
            released: AtomicU64::new(0),
        }
    }

    /// Make subsequent acquisitions fail (or succeed again with `None`)
    pub fn set_failure(&self, failure: Option<SimulatedFailure>) {
        *self.failure.lock() = failure;
    }

    /// Sessions currently open
    pub fn open_count(&self) -> usize {
        self.ledger.lock().open.len()
    }

    /// Sessions ever opened
    pub fn opened_total(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    /// Sessions ever released
    pub fn released_total(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }
}

impl MediaSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn acquire(&self, constraints: &MediaConstraints) -> AcquireFuture {
        let latency = self.latency;
        let failure = self.failure.clone();
        let ledger = self.ledger.clone();
        let opened = self.opened.clone();
        let (width, height) = (constraints.ideal_width, constraints.ideal_height);
        let video = constraints.video;

        Box::pin(async move {
            tokio::time::sleep(latency).await;

            if !video {
                return Err(AcquisitionError::Unknown("no video track requested".to_string()));
            }
            if let Some(failure) = *failure.lock() {
                return Err(failure.into());
            }

            let handle = StreamHandle::new("Simulated Camera", width, height);
            ledger.lock().open.insert(handle.id());
            opened.fetch_add(1, Ordering::Relaxed);
            Ok(handle)
        })
    }

    fn release(&self, handle: StreamHandle) {
        if self.ledger.lock().open.remove(&handle.id()) {
            self.released.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::warn!(handle = %handle.id(), "Release of unknown simulated session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_acquire_and_release() {
        let source = SimulatedSource::new(Duration::from_millis(50));
        let handle = source.acquire(&MediaConstraints::preview()).await.unwrap();

        assert_eq!((handle.width(), handle.height()), (640, 480));
        assert_eq!(source.open_count(), 1);

        source.release(handle);
        assert_eq!(source.open_count(), 0);
        assert_eq!(source.opened_total(), 1);
        assert_eq!(source.released_total(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_failure() {
        let source = SimulatedSource::new(Duration::ZERO);
        source.set_failure(Some(SimulatedFailure::PermissionDenied));

        let result = source.acquire(&MediaConstraints::preview()).await;
        assert_eq!(result.unwrap_err(), AcquisitionError::PermissionDenied);
        assert_eq!(source.opened_total(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_read_at_completion() {
        let source = SimulatedSource::new(Duration::from_millis(10));
        let pending = source.acquire(&MediaConstraints::preview());
        source.set_failure(Some(SimulatedFailure::DeviceUnavailable));

        assert!(matches!(
            pending.await,
            Err(AcquisitionError::DeviceUnavailable(_))
        ));
    }
}
