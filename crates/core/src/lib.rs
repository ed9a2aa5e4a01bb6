//! TSPL protocol core.
//!
//! Pure, transport-independent building blocks for TSC-style label printers:
//! command frames ([`build`], [`quote`] and the typed operations in
//! [`commands`]), monochrome bitmap encoding ([`bitmap::encode`]), and status
//! reply decoding ([`status::decode`]). Nothing in this crate performs I/O;
//! the same frame is byte-identical whichever transport later carries it.

#![warn(missing_docs)]

/// Barcode symbologies and QR parameters.
pub mod barcode;
/// Monochrome bitmap encoding.
pub mod bitmap;
/// Frame construction and re-parsing.
pub mod command;
/// One function per printer operation.
pub mod commands;
mod error;
mod number;
/// Status byte decoding.
pub mod status;
/// Fonts, code pages, alignment, rotation and sensors.
pub mod types;

// ── Convenience re-exports ──────────────────────────────────────────────────

pub use barcode::{BarcodeType, QrEccLevel, QrMask, QrMode, QrModel};
pub use bitmap::{Bitmap, encode, encode_image_bytes};
pub use command::{Arg, CRLF, ParsedArg, ParsedFrame, build, parse_frame, quote};
pub use commands::{BarcodeOptions, QrOptions, TextOptions};
pub use error::CommandError;
pub use number::Number;
pub use status::{Status, decode};
pub use types::{CodePage, Font, Rotation, SensorType, TextAlignment};
