//! Video4Linux2 camera source
//!
//! Opening a device node and negotiating a format are blocking ioctls, so
//! they run on the blocking pool. The opened device is parked here, keyed
//! by handle id, and closed by dropping it on release.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use v4l::video::Capture;
use v4l::Device;

use crate::error::AcquisitionError;
use crate::media::{AcquireFuture, MediaConstraints, MediaSource, StreamHandle};

/// Camera source for `/dev/videoN`
pub struct V4l2Source {
    name: String,
    path: String,
    devices: Arc<Mutex<HashMap<Uuid, Device>>>,
}

impl V4l2Source {
    pub fn new(device_index: u32) -> Self {
        Self::with_path(format!("/dev/video{}", device_index))
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: format!("v4l2:{}", path),
            path,
            devices: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Device path this source opens
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sessions currently open
    pub fn open_count(&self) -> usize {
        self.devices.lock().len()
    }
}

/// Open the device and ask for the requested frame size
fn open_device(
    path: &str,
    constraints: &MediaConstraints,
) -> Result<(Device, StreamHandle), AcquisitionError> {
    let dev = Device::with_path(path).map_err(|e| AcquisitionError::from_io(&e))?;

    let label = dev
        .query_caps()
        .map(|caps| caps.card)
        .unwrap_or_else(|_| path.to_string());

    let mut format = dev.format().map_err(|e| AcquisitionError::from_io(&e))?;
    format.width = constraints.ideal_width;
    format.height = constraints.ideal_height;

    // The requested size is only a hint; keep whatever the driver settles on
    let negotiated = match dev.set_format(&format) {
        Ok(f) => f,
        Err(e) if e.raw_os_error() == Some(libc::EBUSY) => {
            return Err(AcquisitionError::from_io(&e));
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "Could not set format, using current device format");
            dev.format().map_err(|e| AcquisitionError::from_io(&e))?
        }
    };

    tracing::debug!(
        path,
        width = negotiated.width,
        height = negotiated.height,
        fourcc = ?negotiated.fourcc,
        "Negotiated V4L2 format"
    );

    let handle = StreamHandle::new(label, negotiated.width, negotiated.height);
    Ok((dev, handle))
}

impl MediaSource for V4l2Source {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire(&self, constraints: &MediaConstraints) -> AcquireFuture {
        let path = self.path.clone();
        let constraints = constraints.clone();
        let devices = self.devices.clone();

        Box::pin(async move {
            if !constraints.video {
                return Err(AcquisitionError::Unknown("no video track requested".to_string()));
            }
            if constraints.audio {
                tracing::debug!(path = %path, "Audio requested but V4L2 source is video only");
            }

            let (dev, handle) =
                tokio::task::spawn_blocking(move || open_device(&path, &constraints))
                    .await
                    .map_err(|e| AcquisitionError::Unknown(e.to_string()))??;

            devices.lock().insert(handle.id(), dev);
            Ok(handle)
        })
    }

    fn release(&self, handle: StreamHandle) {
        // Dropping the device closes the file descriptor
        if self.devices.lock().remove(&handle.id()).is_none() {
            tracing::warn!(handle = %handle.id(), path = %self.path, "Release of unknown V4L2 session");
        }
    }
}
