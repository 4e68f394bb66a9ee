//! Camera-bound scan sessions.
//!
//! A session owns two resources that must live and die together: the
//! acquired hardware stream and the continuous scan loop reading from
//! it. `stop()` releases both, unconditionally and in a fixed order,
//! so partial teardown is never observable once it returns.

use super::{CameraConstraints, VideoDevice, VideoStream};
use crate::error::ScanError;
use crate::result::ScanResult;
use crate::scan::{ContinuousScan, FrameScanner, LoopState, ScanHandle, ScanOptions};
use crate::source::{Frame, PixelSource};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Configuration for a camera-bound session: acquisition constraints
/// plus the scan options forwarded unchanged to the loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraSessionConfig {
    /// Hardware acquisition constraints.
    #[serde(default)]
    pub camera: CameraConstraints,
    /// Continuous-scan options.
    #[serde(default)]
    pub scan: ScanOptions,
}

/// Shares one stream between the session (for teardown) and the scan
/// loop (for frames).
struct SharedStream(Arc<Mutex<Box<dyn VideoStream>>>);

impl PixelSource for SharedStream {
    fn frame(&mut self) -> Result<Frame, ScanError> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .frame()
    }
}

/// A running camera scan session.
///
/// Dropping the session performs the same joint teardown as
/// [`stop`](Self::stop).
pub struct CameraSession {
    stream: Option<Arc<Mutex<Box<dyn VideoStream>>>>,
    loop_handle: Option<ScanHandle>,
}

impl CameraSession {
    /// Acquires a stream from `device` and starts a continuous scan
    /// over it.
    ///
    /// The loop only starts once the stream confirms it is live; an
    /// acquisition failure (or a stream that never goes live) fails
    /// the whole call with [`ScanError::CameraUnavailable`], with no
    /// loop started and no stream leaked.
    pub fn start(
        device: &mut dyn VideoDevice,
        scanner: FrameScanner,
        on_result: impl FnMut(Vec<ScanResult>) + Send + 'static,
        config: CameraSessionConfig,
    ) -> Result<Self, ScanError> {
        Self::start_with_diagnostics(device, scanner, on_result, |_e: &ScanError| {}, config)
    }

    /// As [`start`](Self::start), with an explicit diagnostic sink for
    /// per-frame failures inside the loop.
    pub fn start_with_diagnostics(
        device: &mut dyn VideoDevice,
        scanner: FrameScanner,
        on_result: impl FnMut(Vec<ScanResult>) + Send + 'static,
        on_error: impl FnMut(&ScanError) + Send + 'static,
        config: CameraSessionConfig,
    ) -> Result<Self, ScanError> {
        config.camera.validate()?;

        let mut stream = device.acquire(&config.camera)?;
        // Playback-started confirmation before any scan is scheduled.
        if !stream.is_live() {
            stream.stop_tracks();
            return Err(ScanError::CameraUnavailable(
                "stream failed to start".into(),
            ));
        }

        let stream = Arc::new(Mutex::new(stream));
        let handle = ContinuousScan::start_with_diagnostics(
            scanner,
            SharedStream(Arc::clone(&stream)),
            on_result,
            on_error,
            config.scan,
        );
        tracing::info!("camera session started");

        Ok(Self {
            stream: Some(stream),
            loop_handle: Some(handle),
        })
    }

    /// Stops the session: cancels the scan loop, stops every hardware
    /// track, detaches the stream. All three steps run
    /// unconditionally, in that order. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.loop_handle.take() {
            handle.stop();
        }
        if let Some(stream) = &self.stream {
            stream
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .stop_tracks();
        }
        if self.stream.take().is_some() {
            tracing::info!("camera session stopped");
        }
    }

    /// Current state of the owned scan loop, if the session is still
    /// attached.
    pub fn loop_state(&self) -> Option<LoopState> {
        self.loop_handle.as_ref().map(|h| h.state())
    }

    /// True until `stop()` has run.
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::MockVideoDevice;
    use crate::engine::MockEngine;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    fn fast_options() -> CameraSessionConfig {
        CameraSessionConfig {
            camera: CameraConstraints {
                width: 8,
                height: 8,
                ..Default::default()
            },
            scan: ScanOptions {
                interval_ms: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_session_delivers_results() {
        let mut device = MockVideoDevice::new(255);
        let results = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&results);

        let mut session = CameraSession::start(
            &mut device,
            FrameScanner::new(MockEngine::new()),
            move |_| {
                sink.fetch_add(1, Ordering::SeqCst);
            },
            fast_options(),
        )
        .unwrap();

        assert!(wait_until(Duration::from_secs(2), || {
            results.load(Ordering::SeqCst) > 0
        }));
        session.stop();
    }

    #[test]
    fn test_joint_teardown() {
        let mut device = MockVideoDevice::new(0);
        let tracks = device.tracks_active();

        let mut session = CameraSession::start(
            &mut device,
            FrameScanner::new(MockEngine::new()),
            |_| {},
            fast_options(),
        )
        .unwrap();
        assert!(session.is_active());
        assert!(tracks.load(Ordering::SeqCst));

        session.stop();

        // Both sub-resources released together: no live track and no
        // scheduled scan remain.
        assert!(!tracks.load(Ordering::SeqCst));
        assert!(!session.is_active());
        assert!(session.loop_state().is_none());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut device = MockVideoDevice::new(0);
        let mut session = CameraSession::start(
            &mut device,
            FrameScanner::new(MockEngine::new()),
            |_| {},
            fast_options(),
        )
        .unwrap();

        session.stop();
        session.stop();
        assert!(!session.is_active());
    }

    #[test]
    fn test_drop_tears_down_stream() {
        let mut device = MockVideoDevice::new(0);
        let tracks = device.tracks_active();

        {
            let _session = CameraSession::start(
                &mut device,
                FrameScanner::new(MockEngine::new()),
                |_| {},
                fast_options(),
            )
            .unwrap();
            assert!(tracks.load(Ordering::SeqCst));
        }

        assert!(!tracks.load(Ordering::SeqCst));
    }

    #[test]
    fn test_denied_acquisition_fails_start() {
        let mut device = MockVideoDevice::denying();
        let tracks = device.tracks_active();

        let outcome = CameraSession::start(
            &mut device,
            FrameScanner::new(MockEngine::new()),
            |_| {},
            fast_options(),
        );

        assert!(matches!(
            outcome,
            Err(ScanError::CameraUnavailable(_))
        ));
        // Nothing acquired, nothing leaked.
        assert!(!tracks.load(Ordering::SeqCst));
    }

    #[test]
    fn test_invalid_constraints_fail_start() {
        let mut device = MockVideoDevice::new(0);
        let mut config = fast_options();
        config.camera.width = 0;

        assert!(matches!(
            CameraSession::start(
                &mut device,
                FrameScanner::new(MockEngine::new()),
                |_| {},
                config,
            ),
            Err(ScanError::Config(_))
        ));
    }

    #[test]
    fn test_stop_on_result_session() {
        let mut device = MockVideoDevice::new(255);
        let results = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&results);

        let mut config = fast_options();
        config.scan.stop_on_result = true;

        let mut session = CameraSession::start(
            &mut device,
            FrameScanner::new(MockEngine::new()),
            move |_| {
                sink.fetch_add(1, Ordering::SeqCst);
            },
            config,
        )
        .unwrap();

        assert!(wait_until(Duration::from_secs(2), || {
            session.loop_state() == Some(LoopState::Stopped)
        }));
        // Exactly one delivery, then the loop stopped on its own.
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(results.load(Ordering::SeqCst), 1);
        session.stop();
    }
}
