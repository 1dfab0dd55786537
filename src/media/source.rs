//! Hardware acquisition primitive

use futures_util::future::BoxFuture;

use crate::error::AcquisitionError;
use crate::media::{MediaConstraints, StreamHandle};

/// Future returned by [`MediaSource::acquire`]
pub type AcquireFuture = BoxFuture<'static, Result<StreamHandle, AcquisitionError>>;

/// Something that can open and close camera sessions.
///
/// `acquire` cannot be cancelled once started; callers that lose interest
/// must still take the result and hand any handle back to `release`.
pub trait MediaSource: Send + Sync + 'static {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Start opening a capture session
    fn acquire(&self, constraints: &MediaConstraints) -> AcquireFuture;

    /// Close a capture session. Must not block on I/O.
    fn release(&self, handle: StreamHandle);
}
