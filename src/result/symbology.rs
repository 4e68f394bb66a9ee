//! Supported symbology identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A barcode/2D-code encoding standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbology {
    QrCode,
    Ean13,
    Ean8,
    Upca,
    Upce,
    Isbn10,
    Isbn13,
    Code128,
    Code39,
    Code93,
    Codabar,
    I25,
    Databar,
    DatabarExp,
    Pdf417,
}

impl Symbology {
    /// Every symbology this layer recognizes, in a stable order.
    ///
    /// Static data only; whether the configured engine actually decodes
    /// a given symbology is the engine's concern.
    pub const ALL: [Self; 15] = [
        Symbology::QrCode,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Upca,
        Symbology::Upce,
        Symbology::Isbn10,
        Symbology::Isbn13,
        Symbology::Code128,
        Symbology::Code39,
        Symbology::Code93,
        Symbology::Codabar,
        Symbology::I25,
        Symbology::Databar,
        Symbology::DatabarExp,
        Symbology::Pdf417,
    ];

    /// Human-readable name, as shown to users.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QrCode => "QR Code",
            Self::Ean13 => "EAN-13",
            Self::Ean8 => "EAN-8",
            Self::Upca => "UPC-A",
            Self::Upce => "UPC-E",
            Self::Isbn10 => "ISBN-10",
            Self::Isbn13 => "ISBN-13",
            Self::Code128 => "Code 128",
            Self::Code39 => "Code 39",
            Self::Code93 => "Code 93",
            Self::Codabar => "Codabar",
            Self::I25 => "Interleaved 2 of 5",
            Self::Databar => "GS1 DataBar",
            Self::DatabarExp => "GS1 DataBar Expanded",
            Self::Pdf417 => "PDF417",
        }
    }
}

impl Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
