//! Canonical scan results.
//!
//! Engines report symbols in their own native shape; this module maps
//! them into a stable output record so callers never depend on
//! engine-specific field layouts. Normalization is pure: no state, no
//! reference back to the frame or engine, ordering preserved.

mod symbology;

pub use symbology::Symbology;

use crate::engine::NativeSymbol;

/// A 2D coordinate in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// The normalized, stable-shape output of a successful decode.
///
/// Immutable once produced.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Decoded content as text.
    pub payload: String,
    /// Underlying byte sequence prior to text decoding.
    pub raw_bytes: Vec<u8>,
    /// Code type.
    pub symbology: Symbology,
    /// Human-readable code type name.
    pub symbology_name: String,
    /// Ordered boundary/finder-pattern points.
    pub points: Vec<Point>,
    /// Engine confidence score; 0 when the engine reported none.
    pub quality: i32,
    /// Orientation indicator; 0 when the engine reported none.
    pub orientation: i32,
}

/// Maps engine-native records into canonical results.
///
/// Missing optional fields map to defaults rather than failing:
/// absent text falls back to lossy UTF-8 of the raw bytes, absent
/// quality/orientation to 0, absent points to an empty list. Output
/// order matches the engine's output order.
pub fn normalize(symbols: Vec<NativeSymbol>) -> Vec<ScanResult> {
    symbols.into_iter().map(normalize_one).collect()
}

fn normalize_one(symbol: NativeSymbol) -> ScanResult {
    let payload = match symbol.text {
        Some(text) => text,
        None => String::from_utf8_lossy(&symbol.data).into_owned(),
    };
    ScanResult {
        payload,
        raw_bytes: symbol.data,
        symbology: symbol.symbology,
        symbology_name: symbol.symbology.name().to_string(),
        points: symbol
            .points
            .into_iter()
            .map(|(x, y)| Point { x, y })
            .collect(),
        quality: symbol.quality.unwrap_or(0),
        orientation: symbol.orientation.unwrap_or(0),
    }
}
