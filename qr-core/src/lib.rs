//! Encodes and decodes QR Code symbols per ISO/IEC 18004 (Model 2).
//!
//! The encoder turns bytes (or caller-built segments) into a `QrCode`, a
//! square grid of dark/light modules, automatically choosing mode, version
//! and mask unless told otherwise. The decoder locates and reads symbols
//! out of an arbitrary pixel source — no image codec is linked in here;
//! `qr-png` (or any other caller) supplies pixels through `PixelSource`.
//!
//! # Examples
//!
//! ```
//! use qr_core::diagnostics::NullDiagnostics;
//! use qr_core::encoder::{EncodeOptions, Encoder};
//!
//! let enc = Encoder::new(&NullDiagnostics);
//! let qr = enc.encode_bytes(b"Hello, world!", &EncodeOptions::default()).unwrap();
//! for y in 0..qr.dimension() {
//!     for x in 0..qr.dimension() {
//!         let _dark = qr.get_module(x, y);
//!     }
//! }
//! ```
//!
//! Manual operation, picking an exact version/mask:
//!
//! ```
//! use qr_core::ec_level::ErrorCorrectionLevel;
//! use qr_core::diagnostics::NullDiagnostics;
//! use qr_core::encoder::{EncodeOptions, Encoder};
//! use qr_core::mask::Mask;
//! use qr_core::segment::Segment;
//! use qr_core::version::Version;
//!
//! let segs = vec![Segment::make_numeric(b"3141592653589793238462643383")];
//! let opts = EncodeOptions {
//!     ecl: ErrorCorrectionLevel::High,
//!     mask: Some(Mask::new(2)),
//!     min_version: Version::new(5),
//!     max_version: Version::new(5),
//!     boost_ecl: false,
//! };
//! let qr = Encoder::new(&NullDiagnostics).encode_segments(&segs, &opts).unwrap();
//! assert_eq!(qr.version.value(), 5);
//! ```

// The set of all legal characters in alphanumeric mode, where each
// character's value is its index in this string.
pub(crate) static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

pub mod bit_buffer;
pub mod bitstream;
pub mod decoder;
pub mod diagnostics;
pub mod ec_level;
pub mod encoder;
pub mod error;
pub mod finder_penalty;
pub mod gf256;
pub mod layout;
pub mod mask;
pub mod matrix;
pub mod segment;
pub mod segment_mode;
pub mod tables;
pub mod version;
