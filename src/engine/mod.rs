//! Decoding-engine seam.
//!
//! The pixel-to-symbol decoding algorithm is an external collaborator:
//! this crate orchestrates it but never implements it. [`DecodeEngine`]
//! is the trait boundary, allowing real engine bindings and mock
//! implementations for testing to be swapped freely. [`EngineHandle`]
//! adds single-flight lazy initialization on top of any engine.

mod handle;

pub use handle::EngineHandle;

use crate::result::Symbology;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a decoding engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("engine initialization failed: {0}")]
    InitFailed(String),
    #[error("engine rejected frame: {0}")]
    DecodeRejected(String),
    #[error("engine not present in this environment")]
    NotPresent,
}

/// A symbol record in the engine's native shape.
///
/// Optional fields model engines that omit metadata; normalization
/// (see [`crate::result`]) maps absent fields to defined defaults.
#[derive(Debug, Clone)]
pub struct NativeSymbol {
    /// Raw decoded bytes, prior to any text decoding.
    pub data: Vec<u8>,
    /// Decoded text, if the engine performed text decoding itself.
    pub text: Option<String>,
    /// Code type of the symbol.
    pub symbology: Symbology,
    /// Boundary/finder-pattern points in source-image pixel space.
    pub points: Vec<(i32, i32)>,
    /// Engine confidence/quality score.
    pub quality: Option<i32>,
    /// Rotation/orientation indicator.
    pub orientation: Option<i32>,
}

impl NativeSymbol {
    /// Creates a minimal record carrying only data and symbology.
    pub fn new(data: impl Into<Vec<u8>>, symbology: Symbology) -> Self {
        Self {
            data: data.into(),
            text: None,
            symbology,
            points: Vec::new(),
            quality: None,
            orientation: None,
        }
    }
}

/// Trait for decoding-engine implementations.
///
/// This abstraction allows swapping between real engine bindings
/// and mock implementations for testing.
pub trait DecodeEngine: Send {
    /// Performs the engine's one-time initialization handshake.
    fn initialize(&mut self) -> Result<(), EngineError>;

    /// Decodes one grayscale frame, returning zero or more symbols.
    ///
    /// `pixels` is row-major, `pixels.len() == width * height`.
    fn decode(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<NativeSymbol>, EngineError>;
}

/// Observed call counts for a [`MockEngine`].
#[derive(Debug, Default, Clone)]
pub struct MockEngineStats {
    /// Number of `initialize` invocations.
    pub init_attempts: u64,
    /// Number of `decode` invocations.
    pub decode_calls: u64,
}

/// Mock engine for testing and demos.
///
/// Decodes nothing for all-zero (blank) frames and returns the
/// configured symbol list for any frame whose first pixel is non-zero,
/// letting tests distinguish "no symbol found" from "symbol found"
/// without a real decoder.
pub struct MockEngine {
    symbols: Vec<NativeSymbol>,
    fail_init: bool,
    fail_decode: bool,
    init_delay: Duration,
    decode_delay: Duration,
    stats: Arc<Mutex<MockEngineStats>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            symbols: vec![NativeSymbol {
                data: b"HELLO".to_vec(),
                text: Some("HELLO".to_string()),
                symbology: Symbology::QrCode,
                points: vec![(0, 0), (10, 0), (10, 10), (0, 10)],
                quality: Some(1),
                orientation: Some(0),
            }],
            fail_init: false,
            fail_decode: false,
            init_delay: Duration::ZERO,
            decode_delay: Duration::ZERO,
            stats: Arc::new(Mutex::new(MockEngineStats::default())),
        }
    }

    /// Replaces the symbol list returned for non-blank frames.
    pub fn with_symbols(mut self, symbols: Vec<NativeSymbol>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Makes every `initialize` call fail.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Makes every `decode` call fail.
    pub fn failing_decode(mut self) -> Self {
        self.fail_decode = true;
        self
    }

    /// Delays `initialize`, widening the race window for
    /// concurrency tests.
    pub fn with_init_delay(mut self, delay: Duration) -> Self {
        self.init_delay = delay;
        self
    }

    /// Delays every `decode` call, simulating a slow engine.
    pub fn with_decode_delay(mut self, delay: Duration) -> Self {
        self.decode_delay = delay;
        self
    }

    /// Returns a handle to the shared call counters.
    pub fn stats(&self) -> Arc<Mutex<MockEngineStats>> {
        Arc::clone(&self.stats)
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeEngine for MockEngine {
    fn initialize(&mut self) -> Result<(), EngineError> {
        if !self.init_delay.is_zero() {
            std::thread::sleep(self.init_delay);
        }
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.init_attempts += 1;
        if self.fail_init {
            return Err(EngineError::InitFailed("simulated handshake failure".into()));
        }
        tracing::info!("MockEngine initialized");
        Ok(())
    }

    fn decode(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<NativeSymbol>, EngineError> {
        {
            let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
            stats.decode_calls += 1;
        }
        if !self.decode_delay.is_zero() {
            std::thread::sleep(self.decode_delay);
        }
        if self.fail_decode {
            return Err(EngineError::DecodeRejected("simulated rejection".into()));
        }
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(EngineError::DecodeRejected(format!(
                "buffer size {} does not match {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        if pixels.first().copied().unwrap_or(0) == 0 {
            return Ok(Vec::new());
        }
        Ok(self.symbols.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_blank_frame_decodes_nothing() {
        let mut engine = MockEngine::new();
        engine.initialize().unwrap();

        let symbols = engine.decode(&[0u8; 16], 4, 4).unwrap();
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_mock_bright_frame_decodes_symbol() {
        let mut engine = MockEngine::new();
        engine.initialize().unwrap();

        let symbols = engine.decode(&[255u8; 16], 4, 4).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].data, b"HELLO");
    }

    #[test]
    fn test_mock_dimension_mismatch_rejected() {
        let mut engine = MockEngine::new();
        engine.initialize().unwrap();

        assert!(matches!(
            engine.decode(&[255u8; 10], 4, 4),
            Err(EngineError::DecodeRejected(_))
        ));
    }

    #[test]
    fn test_mock_counts_calls() {
        let mut engine = MockEngine::new();
        let stats = engine.stats();

        engine.initialize().unwrap();
        engine.decode(&[0u8; 4], 2, 2).unwrap();
        engine.decode(&[0u8; 4], 2, 2).unwrap();

        let stats = stats.lock().unwrap();
        assert_eq!(stats.init_attempts, 1);
        assert_eq!(stats.decode_calls, 2);
    }
}
