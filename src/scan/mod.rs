//! Scan orchestration.
//!
//! [`FrameScanner`] performs one decode pass over any pixel source;
//! [`ContinuousScan`] drives repeated passes against a live source at
//! a bounded cadence with cancellation and per-frame failure
//! isolation.
//!
//! Error propagation differs between the two: one-shot scans
//! propagate every failure to the caller; the continuous loop
//! redirects per-frame failures to a diagnostic sink and keeps
//! running, because live video frames are noisy and a single bad
//! frame is expected rather than fatal.

mod continuous;

pub use continuous::{ContinuousScan, LoopState, ScanHandle};

use crate::engine::{DecodeEngine, EngineHandle};
use crate::error::{ConfigError, ScanError};
use crate::result::{normalize, ScanResult};
use crate::source::PixelSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Options for a continuous scan loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Minimum milliseconds between decode attempts.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Stop the loop after the first non-empty result is reported.
    #[serde(default)]
    pub stop_on_result: bool,
}

fn default_interval_ms() -> u64 {
    100
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            stop_on_result: false,
        }
    }
}

impl ScanOptions {
    /// The gating interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validates the options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

/// Performs one decode pass per call: ensure the engine is ready,
/// pull a frame from the source, decode, normalize.
pub struct FrameScanner {
    engine: Arc<EngineHandle>,
}

impl FrameScanner {
    /// Creates a scanner owning a fresh handle around `engine`.
    ///
    /// The engine is initialized lazily on the first scan. Each
    /// scanner owns its own initialization state; use
    /// [`with_handle`](Self::with_handle) to share one engine across
    /// scanners.
    pub fn new(engine: impl DecodeEngine + 'static) -> Self {
        Self {
            engine: Arc::new(EngineHandle::new(engine)),
        }
    }

    /// Creates a scanner over an existing (possibly shared) handle.
    pub fn with_handle(engine: Arc<EngineHandle>) -> Self {
        Self { engine }
    }

    /// Returns the underlying engine handle.
    pub fn engine(&self) -> &Arc<EngineHandle> {
        &self.engine
    }

    /// Triggers engine initialization without scanning.
    pub fn ensure_ready(&self) -> Result<(), ScanError> {
        self.engine.ensure_ready()
    }

    /// Scans one frame from `source`.
    ///
    /// Returns the ordered canonical results; an empty vec when no
    /// symbol was found (never an error for that case). Propagates
    /// every failure unsuppressed; failure isolation is the
    /// continuous loop's job, not this one's.
    pub fn scan(&self, source: &mut dyn PixelSource) -> Result<Vec<ScanResult>, ScanError> {
        self.engine.ensure_ready()?;
        let frame = source.frame()?;
        let symbols = self
            .engine
            .decode(frame.pixels(), frame.width(), frame.height())?;
        Ok(normalize(symbols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use crate::result::Symbology;
    use crate::source::Frame;

    fn bright_frame() -> Frame {
        Frame::new(vec![255u8; 64], 8, 8)
    }

    fn blank_frame() -> Frame {
        Frame::new(vec![0u8; 64], 8, 8)
    }

    #[test]
    fn test_scan_decodes_qr_payload() {
        let scanner = FrameScanner::new(MockEngine::new());

        let results = scanner.scan(&mut bright_frame()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].payload, "HELLO");
        assert_eq!(results[0].symbology, Symbology::QrCode);
    }

    #[test]
    fn test_blank_frame_yields_empty_not_error() {
        let scanner = FrameScanner::new(MockEngine::new());

        let results = scanner.scan(&mut blank_frame()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_scan_propagates_engine_unavailable() {
        let scanner = FrameScanner::new(MockEngine::new().failing_init());
        assert!(matches!(
            scanner.scan(&mut bright_frame()),
            Err(ScanError::EngineUnavailable(_))
        ));
    }

    #[test]
    fn test_scan_propagates_decode_failure() {
        let scanner = FrameScanner::new(MockEngine::new().failing_decode());
        assert!(matches!(
            scanner.scan(&mut bright_frame()),
            Err(ScanError::DecodeFailure(_))
        ));
    }

    #[test]
    fn test_scan_propagates_frame_source_error() {
        let scanner = FrameScanner::new(MockEngine::new());
        // Buffer does not match claimed dimensions.
        let mut bad = Frame::new(vec![0u8; 5], 8, 8);
        assert!(matches!(
            scanner.scan(&mut bad),
            Err(ScanError::FrameSource(_))
        ));
    }

    #[test]
    fn test_repeated_scans_initialize_once() {
        let engine = MockEngine::new();
        let stats = engine.stats();
        let scanner = FrameScanner::new(engine);

        for _ in 0..5 {
            scanner.scan(&mut blank_frame()).unwrap();
        }
        assert_eq!(stats.lock().unwrap().init_attempts, 1);
    }

    #[test]
    fn test_shared_handle_shares_initialization() {
        let engine = MockEngine::new();
        let stats = engine.stats();
        let handle = Arc::new(EngineHandle::new(engine));

        let a = FrameScanner::with_handle(Arc::clone(&handle));
        let b = FrameScanner::with_handle(handle);
        a.scan(&mut blank_frame()).unwrap();
        b.scan(&mut blank_frame()).unwrap();

        assert_eq!(stats.lock().unwrap().init_attempts, 1);
    }

    #[test]
    fn test_default_options() {
        let options = ScanOptions::default();
        assert_eq!(options.interval_ms, 100);
        assert!(!options.stop_on_result);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_invalid() {
        let options = ScanOptions {
            interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::InvalidInterval)
        ));
    }
}
