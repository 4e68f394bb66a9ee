//! nokhwa-backed camera acquisition.
//!
//! Real hardware backend behind the `camera` cargo feature. Facing
//! mode maps onto device index: most multi-camera platforms enumerate
//! the rear camera first.

use super::{CameraConstraints, FacingMode, VideoDevice, VideoStream};
use crate::error::ScanError;
use crate::source::{Frame, PixelSource};
use nokhwa::{
    pixel_format::LumaFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
    Camera,
};

/// Video device backed by the platform's native capture API.
#[derive(Debug, Default)]
pub struct NokhwaDevice;

impl NokhwaDevice {
    pub fn new() -> Self {
        Self
    }
}

impl VideoDevice for NokhwaDevice {
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<Box<dyn VideoStream>, ScanError> {
        constraints.validate()?;

        let index = match constraints.facing {
            FacingMode::Environment => CameraIndex::Index(0),
            FacingMode::User => CameraIndex::Index(1),
        };
        let requested = RequestedFormat::new::<LumaFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(constraints.width, constraints.height),
                FrameFormat::MJPEG,
                30,
            ),
        ));

        let mut camera = Camera::new(index, requested)
            .map_err(|e| ScanError::CameraUnavailable(e.to_string()))?;
        if let Err(e) = camera.open_stream() {
            // Release the device handle before reporting failure.
            drop(camera);
            return Err(ScanError::CameraUnavailable(e.to_string()));
        }
        tracing::info!(
            facing = ?constraints.facing,
            width = constraints.width,
            height = constraints.height,
            "nokhwa stream acquired"
        );

        Ok(Box::new(NokhwaStream {
            camera,
            live: true,
        }))
    }
}

/// Live stream over an open nokhwa camera.
pub struct NokhwaStream {
    camera: Camera,
    live: bool,
}

impl PixelSource for NokhwaStream {
    fn frame(&mut self) -> Result<Frame, ScanError> {
        if !self.live {
            return Err(ScanError::FrameSource("stream tracks stopped".into()));
        }
        let buffer = self
            .camera
            .frame()
            .map_err(|e| ScanError::FrameSource(e.to_string()))?;
        let gray = buffer
            .decode_image::<LumaFormat>()
            .map_err(|e| ScanError::FrameSource(e.to_string()))?;
        let (width, height) = gray.dimensions();
        Ok(Frame::new(gray.into_raw(), width, height))
    }
}

impl VideoStream for NokhwaStream {
    fn is_live(&self) -> bool {
        self.live
    }

    fn stop_tracks(&mut self) {
        if self.live {
            if let Err(e) = self.camera.stop_stream() {
                tracing::warn!(error = %e, "failed to stop camera stream");
            }
            self.live = false;
            tracing::info!("nokhwa stream stopped");
        }
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
