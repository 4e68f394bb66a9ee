//! Crate-level error types.
//!
//! Four error kinds cover the scan pipeline; each has a distinct
//! propagation policy (see the module docs on [`crate::scan`]).

use thiserror::Error;

/// Errors surfaced by scan operations.
#[derive(Debug, Clone, Error)]
pub enum ScanError {
    /// The decoding engine failed to initialize or is not present.
    ///
    /// Fatal for every decode attempt through the same handle; a new
    /// scanner instance must be created to retry initialization.
    #[error("decoding engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A single decode invocation was rejected by the engine.
    ///
    /// Recoverable, scoped to one frame. The continuous loop redirects
    /// this kind to its diagnostic sink; one-shot calls propagate it.
    #[error("decode failed: {0}")]
    DecodeFailure(String),

    /// Hardware stream acquisition failed (permission denied, no device,
    /// constraints unsatisfiable). Fatal for that `start()` call only.
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// An input adapter could not produce a valid pixel buffer.
    #[error("frame source error: {0}")]
    FrameSource(String),

    /// Configuration file or constraint validation failure.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ScanError {
    /// True for failures scoped to a single frame, which the continuous
    /// loop isolates instead of propagating.
    pub fn is_per_frame(&self) -> bool {
        matches!(self, Self::DecodeFailure(_) | Self::FrameSource(_))
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("scan interval must be non-zero")]
    InvalidInterval,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}
