//! Shared fakes for integration tests
#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

use camera_preview::error::AcquisitionError;
use camera_preview::media::{AcquireFuture, MediaConstraints, MediaSource, StreamHandle};
use camera_preview::preview::{PreviewBinding, RenderSink, StreamController};

/// Everything the fakes saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Acquire,
    Bind(Uuid),
    Unbind,
    Release(Uuid),
}

pub type Journal = Arc<Mutex<Vec<Event>>>;

type Reply = oneshot::Sender<Result<StreamHandle, AcquisitionError>>;

/// Source whose acquisitions complete only when the test says so
pub struct ManualSource {
    journal: Journal,
    waiting: Mutex<Vec<Reply>>,
    issued: Mutex<Vec<Uuid>>,
    constraints: Mutex<Vec<MediaConstraints>>,
}

impl ManualSource {
    pub fn new(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            journal,
            waiting: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
            constraints: Mutex::new(Vec::new()),
        })
    }

    pub fn acquire_calls(&self) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|e| **e == Event::Acquire)
            .count()
    }

    /// Acquisitions not yet resolved by the test
    pub fn waiting(&self) -> usize {
        self.waiting.lock().len()
    }

    /// Resolve the `index`-th oldest waiting acquisition with a new handle
    pub fn succeed_at(&self, index: usize) -> Uuid {
        let reply = self.waiting.lock().remove(index);
        let handle = StreamHandle::new("Fake Camera", 640, 480);
        let id = handle.id();
        self.issued.lock().push(id);
        if let Err(Ok(orphan)) = reply.send(Ok(handle)) {
            // Nobody is listening any more; give it straight back
            self.release(orphan);
        }
        id
    }

    pub fn succeed_next(&self) -> Uuid {
        self.succeed_at(0)
    }

    pub fn fail_at(&self, index: usize, reason: AcquisitionError) {
        let reply = self.waiting.lock().remove(index);
        let _ = reply.send(Err(reason));
    }

    pub fn fail_next(&self, reason: AcquisitionError) {
        self.fail_at(0, reason)
    }

    /// Every handle ever produced
    pub fn issued(&self) -> Vec<Uuid> {
        self.issued.lock().clone()
    }

    pub fn release_count(&self, id: Uuid) -> usize {
        self.journal
            .lock()
            .iter()
            .filter(|e| **e == Event::Release(id))
            .count()
    }

    /// Handles produced and not yet released
    pub fn live(&self) -> Vec<Uuid> {
        self.issued()
            .into_iter()
            .filter(|id| self.release_count(*id) == 0)
            .collect()
    }

    pub fn requested_constraints(&self) -> Vec<MediaConstraints> {
        self.constraints.lock().clone()
    }
}

impl MediaSource for ManualSource {
    fn name(&self) -> &str {
        "manual"
    }

    fn acquire(&self, constraints: &MediaConstraints) -> AcquireFuture {
        let (tx, rx) = oneshot::channel();
        self.journal.lock().push(Event::Acquire);
        self.constraints.lock().push(constraints.clone());
        self.waiting.lock().push(tx);

        Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(AcquisitionError::Unknown("reply dropped".to_string())))
        })
    }

    fn release(&self, handle: StreamHandle) {
        self.journal.lock().push(Event::Release(handle.id()));
    }
}

/// Sink that writes into the shared journal
pub struct RecordingSink {
    journal: Journal,
    current: Option<Uuid>,
    /// Set if a source was bound on top of another one
    pub overlapped: bool,
}

impl RecordingSink {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            current: None,
            overlapped: false,
        }
    }

    pub fn current(&self) -> Option<Uuid> {
        self.current
    }
}

impl RenderSink for RecordingSink {
    fn bind_source(&mut self, handle: &StreamHandle) {
        if self.current.is_some() {
            self.overlapped = true;
        }
        self.current = Some(handle.id());
        self.journal.lock().push(Event::Bind(handle.id()));
    }

    fn unbind_source(&mut self) {
        self.current = None;
        self.journal.lock().push(Event::Unbind);
    }
}

/// Controller wired to fakes, plus the handles to inspect them
pub struct Rig {
    pub journal: Journal,
    pub source: Arc<ManualSource>,
    pub captures: Arc<AtomicUsize>,
    pub controller: StreamController<PreviewBinding<RecordingSink>>,
}

impl Rig {
    pub fn new() -> Self {
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));
        let source = ManualSource::new(journal.clone());
        let captures = Arc::new(AtomicUsize::new(0));

        let counter = captures.clone();
        let binding = PreviewBinding::new(RecordingSink::new(journal.clone())).with_capture(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let controller =
            StreamController::new(source.clone(), binding, MediaConstraints::preview())
                .expect("tests run inside a tokio runtime");

        Self {
            journal,
            source,
            captures,
            controller,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.journal.lock().clone()
    }

    pub fn bind_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Bind(_)))
            .count()
    }

    pub fn sink_source(&self) -> Option<Uuid> {
        self.controller.observe(|b| b.sink().current())
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

/// Let woken acquisition tasks run to completion
pub async fn flush() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
