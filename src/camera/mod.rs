//! Camera acquisition and camera-bound scan sessions.
//!
//! This module provides a trait-based abstraction over hardware video
//! streams, allowing for both real camera input and mock
//! implementations for testing. A [`CameraSession`] binds an acquired
//! stream's lifecycle to a continuous scan loop's lifecycle so the
//! two are always torn down together.

mod session;

#[cfg(feature = "camera")]
mod nokhwa_device;

pub use session::{CameraSession, CameraSessionConfig};

#[cfg(feature = "camera")]
pub use nokhwa_device::NokhwaDevice;

use crate::error::{ConfigError, ScanError};
use crate::source::{Frame, PixelSource};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which camera to prefer on devices that have more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear-facing camera.
    #[default]
    Environment,
    /// Front-facing camera.
    User,
}

/// Constraints for hardware stream acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConstraints {
    /// Preferred camera facing.
    #[serde(default)]
    pub facing: FacingMode,
    /// Requested frame width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Requested frame height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::default(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl CameraConstraints {
    /// Validates the constraint parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// An acquired hardware video stream.
///
/// Yields the current frame on demand like any pixel source, and adds
/// track lifecycle control.
pub trait VideoStream: PixelSource + Send {
    /// True while the stream is producing frames (playback started
    /// and tracks not stopped).
    fn is_live(&self) -> bool;

    /// Stops every hardware track. Idempotent.
    fn stop_tracks(&mut self);
}

/// Trait for camera acquisition backends.
///
/// This abstraction allows swapping between real camera hardware and
/// mock implementations for testing.
pub trait VideoDevice {
    /// Acquires a video stream satisfying `constraints`.
    ///
    /// Failure (permission denied, no device, constraints
    /// unsatisfiable) is a [`ScanError::CameraUnavailable`] and must
    /// not leak a partially-acquired stream.
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<Box<dyn VideoStream>, ScanError>;
}

/// Mock video device for testing that generates synthetic streams.
pub struct MockVideoDevice {
    deny: bool,
    frame_fill: u8,
    tracks_active: Arc<AtomicBool>,
}

impl MockVideoDevice {
    /// A device whose streams yield frames filled with `frame_fill`.
    ///
    /// With the mock engine, a zero fill reads as a blank frame and a
    /// non-zero fill as a frame containing a symbol.
    pub fn new(frame_fill: u8) -> Self {
        Self {
            deny: false,
            frame_fill,
            tracks_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Makes every acquisition fail, as when permission is denied.
    pub fn denying() -> Self {
        Self {
            deny: true,
            frame_fill: 0,
            tracks_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Observer for the hardware-track state of acquired streams.
    pub fn tracks_active(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.tracks_active)
    }
}

impl VideoDevice for MockVideoDevice {
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<Box<dyn VideoStream>, ScanError> {
        constraints.validate()?;
        if self.deny {
            return Err(ScanError::CameraUnavailable("permission denied".into()));
        }
        self.tracks_active.store(true, Ordering::SeqCst);
        tracing::info!(
            facing = ?constraints.facing,
            width = constraints.width,
            height = constraints.height,
            "MockVideoDevice stream acquired"
        );
        Ok(Box::new(MockVideoStream {
            width: constraints.width,
            height: constraints.height,
            frame_fill: self.frame_fill,
            tracks_active: Arc::clone(&self.tracks_active),
        }))
    }
}

/// Synthetic stream produced by [`MockVideoDevice`].
pub struct MockVideoStream {
    width: u32,
    height: u32,
    frame_fill: u8,
    tracks_active: Arc<AtomicBool>,
}

impl PixelSource for MockVideoStream {
    fn frame(&mut self) -> Result<Frame, ScanError> {
        if !self.is_live() {
            return Err(ScanError::FrameSource("stream tracks stopped".into()));
        }
        let len = (self.width as usize) * (self.height as usize);
        Ok(Frame::new(vec![self.frame_fill; len], self.width, self.height))
    }
}

impl VideoStream for MockVideoStream {
    fn is_live(&self) -> bool {
        self.tracks_active.load(Ordering::SeqCst)
    }

    fn stop_tracks(&mut self) {
        self.tracks_active.store(false, Ordering::SeqCst);
        tracing::info!("MockVideoStream tracks stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_stream_lifecycle() {
        let mut device = MockVideoDevice::new(255);
        let tracks = device.tracks_active();

        let mut stream = device.acquire(&CameraConstraints::default()).unwrap();
        assert!(stream.is_live());
        assert!(tracks.load(Ordering::SeqCst));

        let frame = stream.frame().unwrap();
        assert_eq!(frame.width(), 1280);
        assert_eq!(frame.height(), 720);
        assert!(frame.is_valid());

        stream.stop_tracks();
        assert!(!stream.is_live());
        assert!(matches!(
            stream.frame(),
            Err(ScanError::FrameSource(_))
        ));
    }

    #[test]
    fn test_denying_device_fails_acquisition() {
        let mut device = MockVideoDevice::denying();
        assert!(matches!(
            device.acquire(&CameraConstraints::default()),
            Err(ScanError::CameraUnavailable(_))
        ));
    }

    #[test]
    fn test_zero_dimension_constraints_rejected() {
        let constraints = CameraConstraints {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            constraints.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }
}
