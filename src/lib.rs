//! Optiscan
//!
//! An in-process optical-symbol recognition facade: feed it images
//! from any source (files, raw pixel buffers, base64 strings, live
//! camera frames) and get decoded symbol payloads (linear barcodes,
//! 2D matrix codes) back, with no network round-trip. The decoding
//! algorithm itself lives behind the [`engine::DecodeEngine`] seam;
//! this crate is the orchestration around it.
//!
//! # Architecture
//!
//! ```text
//! camera session → continuous loop → frame scanner → engine handle → engine
//!                                          ↑
//!                 pixel sources (file, bytes, base64, raw buffer)
//! ```
//!
//! Results flow back up through normalization to a caller-supplied
//! sink.
//!
//! # Design Principles
//!
//! - **Single-flight initialization**: concurrent first use collapses
//!   into one engine handshake; all callers share its outcome
//! - **Sequential decode attempts**: a loop never starts a scan while
//!   a previous one is unresolved, regardless of tick cadence
//! - **Per-frame failure isolation**: a noisy video frame never
//!   terminates a continuous loop
//! - **Joint teardown**: a camera session's stream and loop are
//!   released together, never one without the other
//!
//! # Example
//!
//! ```
//! use optiscan::{engine::MockEngine, scan::FrameScanner, source::Frame};
//!
//! let scanner = FrameScanner::new(MockEngine::new());
//!
//! // A raw grayscale buffer is itself a pixel source.
//! let mut frame = Frame::new(vec![255u8; 64], 8, 8);
//!
//! let results = scanner.scan(&mut frame).unwrap();
//! assert_eq!(results[0].payload, "HELLO");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod result;
pub mod scan;
pub mod source;

// Re-export commonly used types at crate root
pub use camera::{CameraConstraints, CameraSession, CameraSessionConfig, FacingMode};
pub use config::ScannerConfig;
pub use engine::{DecodeEngine, EngineHandle, MockEngine, NativeSymbol};
pub use error::ScanError;
pub use result::{Point, ScanResult, Symbology};
pub use scan::{ContinuousScan, FrameScanner, ScanHandle, ScanOptions};
pub use source::{Frame, PixelSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
