//! Camera preview: lifecycle controller plus the binding that shows it

pub mod binding;
pub mod controller;
pub mod sink;
pub mod state;

pub use binding::{CaptureCallback, PreviewBinding, StateObserver};
pub use controller::StreamController;
pub use sink::{LogSink, RenderSink};
pub use state::{AcquisitionToken, ControllerState, DesiredState, PreviewStatus};
