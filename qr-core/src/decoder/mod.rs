//! Locates and decodes QR Code symbols in a scanned image.
//!
//! The pipeline is binarize -> locate finders -> group into candidate
//! corners -> solve a geometry transform -> extract + correct + decode each
//! candidate. Every stage past binarization is allowed to fail per
//! candidate without aborting the scan: a bent photo or a stray dark blob
//! just costs one skipped guess, not the whole decode.

pub mod alignment;
pub mod binarizer;
pub mod extractor;
pub mod finder;
pub mod geometry;
pub mod pixel_source;

use crate::decoder::alignment::locate_alignment_pattern;
use crate::decoder::binarizer::BinaryImage;
use crate::decoder::extractor::ExtractedSymbol;
use crate::decoder::finder::{group_finders, locate_finders, Match};
use crate::decoder::geometry::{affine_from_match, predict_alignment_pixel, Transform};
use crate::decoder::pixel_source::PixelSource;
use crate::diagnostics::{DiagLevel, Diagnostics};
use crate::error::QrDecodeError;
use crate::tables::alignment_pattern_positions;
use crate::version::Version;

/// Options for `Decoder::decode`.
#[derive(Clone, Copy)]
pub struct DecodeOptions {
    /// Charset used by `extractor::decode_to_string`'s convenience
    /// text-decoding path. Has no effect on `decode`'s raw-byte results.
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { charset: encoding_rs::UTF_8 }
    }
}

/// A single candidate geometry's outcome.
enum CandidateOutcome {
    Decoded(ExtractedSymbol),
    Skip,
}

/// Decodes QR Code symbols out of a pixel source.
pub struct Decoder<'d> {
    diagnostics: &'d dyn Diagnostics,
}

impl<'d> Decoder<'d> {
    pub fn new(diagnostics: &'d dyn Diagnostics) -> Self {
        Self { diagnostics }
    }

    /// Locates and decodes every symbol visible in `img`, returning each as
    /// raw payload bytes. The outer search may, on a busy or ambiguous
    /// image, report the same symbol more than once — callers that care
    /// should deduplicate.
    pub fn decode(&self, img: &dyn PixelSource, _options: &DecodeOptions) -> Vec<Vec<u8>> {
        let binary = match BinaryImage::binarize(img) {
            Ok(b) => b,
            Err(e) => {
                self.diagnostics.emit(DiagLevel::Warn, &format!("binarization failed: {e}"));
                return Vec::new();
            }
        };

        let finders = locate_finders(&binary);
        if finders.len() < 3 {
            self.diagnostics.emit(DiagLevel::Debug, &QrDecodeError::NoFinders.to_string());
            return Vec::new();
        }

        let candidates = group_finders(&finders);
        if candidates.is_empty() {
            self.diagnostics.emit(DiagLevel::Debug, &QrDecodeError::NoCorner.to_string());
            return Vec::new();
        }

        let mut results = Vec::new();
        for m in candidates {
            if let CandidateOutcome::Decoded(symbol) = self.try_candidate(&binary, &m) {
                self.diagnostics.emit(
                    DiagLevel::Info,
                    &format!("decoded version {} ecl {:?} mask {:?}", symbol.version.value(), symbol.ecl, symbol.mask),
                );
                results.push(symbol.data);
            }
        }
        results
    }

    /// Convenience wrapper over `decode`: decodes each located symbol's raw
    /// payload as text using `options.charset` instead of returning bytes.
    pub fn decode_to_string(&self, img: &dyn PixelSource, options: &DecodeOptions) -> Vec<String> {
        self.decode(img, options).into_iter().map(|data| extractor::decode_to_string(&data, options.charset)).collect()
    }

    // Tries a small window of version guesses around the one implied by the
    // finder triple's spacing, since module-size measurement noise can be
    // off by a module or two at low resolutions.
    fn try_candidate(&self, img: &BinaryImage, m: &Match) -> CandidateOutcome {
        let guess = estimate_version(m);
        for v in (guess - 1)..=(guess + 1) {
            if !(i32::from(Version::MIN.value())..=i32::from(Version::MAX.value())).contains(&v) {
                continue;
            }
            let version = Version::new(v as u8);
            let transform = match self.build_transform(img, m, version) {
                Some(t) => t,
                None => continue,
            };
            match extractor::extract(img, &transform, version) {
                Ok(symbol) => return CandidateOutcome::Decoded(symbol),
                Err(e) => {
                    self.diagnostics.emit(DiagLevel::Debug, &format!("candidate v{v} rejected: {e}"));
                }
            }
        }
        CandidateOutcome::Skip
    }

    // Builds the best transform available for this version guess: an
    // alignment-refined 4-point projective fit if an alignment pattern is
    // found nearby, else the plain 3-point affine fit from the finder
    // triple alone.
    fn build_transform(&self, img: &BinaryImage, m: &Match, version: Version) -> Option<Transform> {
        let affine = affine_from_match(m, version.dimension()).ok()?;
        if !version.has_alignment_patterns() {
            return Some(affine);
        }

        let align_positions = alignment_pattern_positions(version);
        let bottom_right = *align_positions.last()?;
        if bottom_right <= 3 {
            return Some(affine);
        }

        let (hint_x, hint_y) = predict_alignment_pixel(m);
        let module_size = (m.top_left.module_size + m.top_right.module_size + m.bottom_left.module_size) / 3.0;
        let Some((ax, ay)) = locate_alignment_pattern(img, hint_x, hint_y, module_size) else {
            return Some(affine);
        };

        let d = f64::from(version.dimension());
        let module_pts = [(3.0, 3.0), (d - 4.0, 3.0), (3.0, d - 4.0), (f64::from(bottom_right), f64::from(bottom_right))];
        let pixel_pts = [
            (m.top_left.x, m.top_left.y),
            (m.top_right.x, m.top_right.y),
            (m.bottom_left.x, m.bottom_left.y),
            (ax, ay),
        ];
        Some(Transform::from_quad(module_pts, pixel_pts).unwrap_or(affine))
    }
}

fn estimate_version(m: &Match) -> i32 {
    let leg1 = dist(m.top_left.x, m.top_left.y, m.top_right.x, m.top_right.y);
    let leg2 = dist(m.top_left.x, m.top_left.y, m.bottom_left.x, m.bottom_left.y);
    let module_size = (m.top_left.module_size + m.top_right.module_size + m.bottom_left.module_size) / 3.0;
    if module_size <= 0.0 {
        return 1;
    }
    let dim_estimate = (leg1 + leg2) / 2.0 / module_size + 7.0;
    (((dim_estimate - 17.0) / 4.0).round() as i32).clamp(1, 40)
}

fn dist(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::pixel_source::RawBgrImage;
    use crate::diagnostics::NullDiagnostics;
    use crate::ec_level::ErrorCorrectionLevel;
    use crate::encoder::{EncodeOptions, Encoder};

    fn render(qr: &crate::encoder::QrCode, scale: u32, quiet: u32) -> RawBgrImage {
        let dim = qr.dimension();
        let side = dim as u32 * scale + 2 * quiet * scale;
        let mut bgr = vec![255u8; (side * side * 3) as usize];
        for y in 0..dim {
            for x in 0..dim {
                if qr.get_module(x, y) {
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = quiet * scale + x as u32 * scale + dx;
                            let py = quiet * scale + y as u32 * scale + dy;
                            let idx = ((py * side + px) * 3) as usize;
                            bgr[idx] = 0;
                            bgr[idx + 1] = 0;
                            bgr[idx + 2] = 0;
                        }
                    }
                }
            }
        }
        RawBgrImage::new(side, side, bgr)
    }

    #[test]
    fn finds_and_decodes_a_rendered_symbol_end_to_end() {
        let enc = Encoder::new(&NullDiagnostics);
        let opts = EncodeOptions {
            ecl: ErrorCorrectionLevel::Medium,
            mask: None,
            min_version: Version::new(1),
            max_version: Version::new(1),
            boost_ecl: false,
        };
        let qr = enc.encode_bytes(b"HELLO WORLD", &opts).unwrap();
        let img = render(&qr, 4, 4);

        let decoder = Decoder::new(&NullDiagnostics);
        let results = decoder.decode(&img, &DecodeOptions::default());
        assert!(results.iter().any(|d| d == b"HELLO WORLD"));
    }

    #[test]
    fn decodes_a_larger_symbol_with_alignment_patterns() {
        let enc = Encoder::new(&NullDiagnostics);
        let opts = EncodeOptions {
            ecl: ErrorCorrectionLevel::Medium,
            mask: None,
            min_version: Version::new(9),
            max_version: Version::new(9),
            boost_ecl: false,
        };
        let payload = vec![b'A'; 50];
        let qr = enc.encode_bytes(&payload, &opts).unwrap();
        let img = render(&qr, 3, 4);

        let decoder = Decoder::new(&NullDiagnostics);
        let results = decoder.decode(&img, &DecodeOptions::default());
        assert!(results.iter().any(|d| d == &payload));
    }

    #[test]
    fn returns_nothing_for_a_blank_image() {
        let img = RawBgrImage::new(50, 50, vec![255u8; 50 * 50 * 3]);
        let decoder = Decoder::new(&NullDiagnostics);
        assert!(decoder.decode(&img, &DecodeOptions::default()).is_empty());
    }
}
