//! Media acquisition subsystem
//!
//! The hardware side of the preview: what we ask a camera for, the handle
//! we get back, and the sources that hand those handles out.

pub mod constraints;
pub mod handle;
pub mod simulated;
pub mod source;
#[cfg(all(target_os = "linux", feature = "v4l2"))]
pub mod v4l2;

pub use constraints::{FacingMode, MediaConstraints};
pub use handle::StreamHandle;
pub use simulated::{SimulatedFailure, SimulatedSource};
pub use source::{AcquireFuture, MediaSource};
#[cfg(all(target_os = "linux", feature = "v4l2"))]
pub use v4l2::V4l2Source;
