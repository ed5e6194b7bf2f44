use crate::bit_buffer::BitBuffer;
use crate::diagnostics::{DiagLevel, Diagnostics};
use crate::ec_level::ErrorCorrectionLevel;
use crate::error::QrEncodeError;
use crate::finder_penalty::FinderPenalty;
use crate::gf256;
use crate::layout::SymbolLayout;
use crate::mask::Mask;
use crate::matrix::ModuleMatrix;
use crate::segment::Segment;
use crate::tables::{self, BlockPlan};
use crate::version::Version;

/// Options for `Encoder::encode`, a named struct gathering the version
/// range, error correction level, mask choice and ECL-boost flag.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub ecl: ErrorCorrectionLevel,
    pub mask: Option<Mask>,
    pub min_version: Version,
    pub max_version: Version,
    pub boost_ecl: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ecl: ErrorCorrectionLevel::Medium,
            mask: None,
            min_version: Version::MIN,
            max_version: Version::MAX,
            boost_ecl: true,
        }
    }
}

// For use in score_mask(), when evaluating which mask is best.
const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// A finished QR Code symbol: an immutable square grid of dark/light
/// modules plus the parameters that produced it.
#[derive(Debug, Clone)]
pub struct QrCode {
    pub version: Version,
    pub ecl: ErrorCorrectionLevel,
    pub mask: Mask,
    matrix: ModuleMatrix,
}

impl QrCode {
    pub fn dimension(&self) -> i32 {
        self.version.dimension()
    }

    /// The color of the module at (x, y); `false` (light) if out of bounds.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let dim = self.dimension();
        (0..dim).contains(&x) && (0..dim).contains(&y) && self.matrix.is_dark(x, y)
    }
}

/// Encodes segments into QR Code symbols.
pub struct Encoder<'d> {
    diagnostics: &'d dyn Diagnostics,
}

impl<'d> Encoder<'d> {
    pub fn new(diagnostics: &'d dyn Diagnostics) -> Self {
        Self { diagnostics }
    }

    /// Returns a QR Code representing the given binary payload, choosing
    /// mode(s) automatically via `Segment::make_segments`'s mode
    /// selection rule.
    pub fn encode_bytes(&self, data: &[u8], options: &EncodeOptions) -> Result<QrCode, QrEncodeError> {
        let segs = Segment::make_segments(data);
        self.encode_segments(&segs, options)
    }

    /// Returns a QR Code for a caller-built segment sequence (mid-level API;
    /// lets a caller mix modes, or add an ECI segment).
    pub fn encode_segments(&self, segs: &[Segment], options: &EncodeOptions) -> Result<QrCode, QrEncodeError> {
        assert!(options.min_version <= options.max_version, "min_version must not exceed max_version");

        let mut version = options.min_version;
        let mut ecl = options.ecl;
        let data_used_bits: usize = loop {
            let capacity_bits = tables::num_data_codewords(version, ecl) * 8;
            let data_used = Segment::get_total_bits(segs, version);
            if let Some(n) = data_used {
                if n <= capacity_bits {
                    break n;
                }
            }
            if version >= options.max_version {
                self.diagnostics.emit(DiagLevel::Debug, "no version in range fits the requested segments");
                return Err(match data_used {
                    None => QrEncodeError::SegmentTooLong {
                        min: options.min_version.value(),
                        max: options.max_version.value(),
                    },
                    Some(n) => QrEncodeError::CapacityExceeded { data_bits: n, max_bits: capacity_bits },
                });
            }
            version = Version::new(version.value() + 1);
        };

        if options.boost_ecl {
            for &candidate in &[
                ErrorCorrectionLevel::Medium,
                ErrorCorrectionLevel::Quartile,
                ErrorCorrectionLevel::High,
            ] {
                if candidate > ecl && data_used_bits <= tables::num_data_codewords(version, candidate) * 8 {
                    ecl = candidate;
                }
            }
        }

        let mut bb = BitBuffer(Vec::new());
        for seg in segs {
            bb.append_bits(seg.mode().mode_bits(), 4);
            bb.append_bits(u32::try_from(seg.num_chars()).unwrap(), seg.mode().num_char_count_bits(version));
            bb.0.extend_from_slice(seg.data());
        }
        debug_assert_eq!(bb.0.len(), data_used_bits);

        let capacity_bits = tables::num_data_codewords(version, ecl) * 8;
        let num_zero_bits = std::cmp::min(4, capacity_bits - bb.0.len());
        bb.append_bits(0, u8::try_from(num_zero_bits).unwrap());
        let num_zero_bits = bb.0.len().wrapping_neg() & 7;
        bb.append_bits(0, u8::try_from(num_zero_bits).unwrap());
        debug_assert_eq!(bb.0.len() % 8, 0);

        for &pad_byte in [0xECu32, 0x11].iter().cycle() {
            if bb.0.len() >= capacity_bits {
                break;
            }
            bb.append_bits(pad_byte, 8);
        }

        let mut data_codewords = vec![0u8; bb.0.len() / 8];
        for (i, &bit) in bb.0.iter().enumerate() {
            data_codewords[i >> 3] |= u8::from(bit) << (7 - (i & 7));
        }

        self.diagnostics.emit(DiagLevel::Info, &format!("encoding version {} ecl {:?}", version.value(), ecl));
        Ok(self.encode_codewords(version, ecl, &data_codewords, options.mask))
    }

    /// Low-level entry point: the data codewords (mode headers, character
    /// counts, payload, terminator and padding already applied) are placed,
    /// EC-protected, interleaved and masked.
    pub fn encode_codewords(&self, ver: Version, ecl: ErrorCorrectionLevel, data_codewords: &[u8], mask: Option<Mask>) -> QrCode {
        let layout = SymbolLayout::new(ver);
        let mut matrix = layout.build_base_matrix();

        let all_codewords = Self::add_ecc_and_interleave(ver, ecl, data_codewords);
        Self::draw_codewords(&layout, &mut matrix, &all_codewords);

        let chosen_mask = mask.unwrap_or_else(|| {
            let mut best = Mask::new(0);
            let mut best_penalty = i32::MAX;
            for m in Mask::ALL {
                layout.apply_mask(&mut matrix, m);
                layout.draw_format_bits(&mut matrix, Self::format_codeword(ecl, m));
                let penalty = Self::score_mask(&matrix, ver);
                if penalty < best_penalty {
                    best = m;
                    best_penalty = penalty;
                }
                layout.apply_mask(&mut matrix, m); // undo (XOR)
            }
            best
        });

        layout.apply_mask(&mut matrix, chosen_mask);
        layout.draw_format_bits(&mut matrix, Self::format_codeword(ecl, chosen_mask));
        if ver.has_version_info() {
            layout.draw_version_bits(&mut matrix, Self::version_codeword(ver));
        }

        QrCode { version: ver, ecl, mask: chosen_mask, matrix }
    }

    fn format_codeword(ecl: ErrorCorrectionLevel, mask: Mask) -> u32 {
        tables::all_format_codewords()
            .iter()
            .find(|fc| fc.ecl == ecl && fc.mask == mask)
            .expect("every (ecl, mask) pair has a format codeword")
            .codeword
    }

    fn version_codeword(ver: Version) -> u32 {
        tables::all_version_codewords()
            .iter()
            .find(|&&(_, v)| v == ver.value())
            .expect("every version >= 7 has a version codeword")
            .0
    }

    fn add_ecc_and_interleave(ver: Version, ecl: ErrorCorrectionLevel, data: &[u8]) -> Vec<u8> {
        let plan = BlockPlan::for_version_ecl(ver, ecl);
        assert_eq!(data.len(), plan.total_data_codewords(), "data length must match the EC block plan");

        let generator = gf256::generator_polynomial(plan.ec_cw_per_block);
        let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(plan.total_blocks());
        let mut k = 0;
        for i in 0..plan.total_blocks() {
            let data_len = if i < plan.blocks_group1 { plan.data_cw_group1 } else { plan.data_cw_group2 };
            let block_data = &data[k..k + data_len];
            k += data_len;
            let ec = gf256::compute_remainder(block_data, &generator);
            let mut block = block_data.to_vec();
            block.extend_from_slice(&ec);
            blocks.push(block);
        }

        let longest_data_len = plan.data_cw_group2.max(plan.data_cw_group1);
        let mut result = Vec::with_capacity(plan.total_codewords());
        for i in 0..longest_data_len {
            for block in &blocks {
                if i < block.len() - plan.ec_cw_per_block {
                    result.push(block[i]);
                }
            }
        }
        for i in 0..plan.ec_cw_per_block {
            for block in &blocks {
                result.push(block[block.len() - plan.ec_cw_per_block + i]);
            }
        }
        result
    }

    // The data path can be a few bits longer than the codeword stream: the
    // standard reserves a handful of always-zero "remainder bits" at some
    // versions. Those trailing path positions are simply left at their
    // default light color.
    fn draw_codewords(layout: &SymbolLayout, matrix: &mut ModuleMatrix, data: &[u8]) {
        let path = layout.data_path(matrix);
        let num_bits = data.len() * 8;
        assert!(path.len() >= num_bits, "codeword stream must fit within the data path");
        for (i, &(x, y)) in path.iter().enumerate().take(num_bits) {
            let bit = (data[i >> 3] >> (7 - (i & 7))) & 1 != 0;
            matrix.get_mut(x, y).dark = bit;
        }
    }

    // Scores a candidate mask by the standard's four penalty rules.
    fn score_mask(matrix: &ModuleMatrix, ver: Version) -> i32 {
        let size = ver.dimension();
        let mut result = 0i32;

        for y in 0..size {
            let mut run_color = false;
            let mut run_x = 0i32;
            let mut history = FinderPenalty::new(size);
            for x in 0..size {
                if matrix.is_dark(x, y) == run_color {
                    run_x += 1;
                    if run_x == 5 {
                        result += PENALTY_N1;
                    } else if run_x > 5 {
                        result += 1;
                    }
                } else {
                    history.add_history(run_x);
                    if !run_color {
                        result += history.count_patterns() * PENALTY_N3;
                    }
                    run_color = matrix.is_dark(x, y);
                    run_x = 1;
                }
            }
            result += history.terminate_and_count(run_color, run_x) * PENALTY_N3;
        }

        for x in 0..size {
            let mut run_color = false;
            let mut run_y = 0i32;
            let mut history = FinderPenalty::new(size);
            for y in 0..size {
                if matrix.is_dark(x, y) == run_color {
                    run_y += 1;
                    if run_y == 5 {
                        result += PENALTY_N1;
                    } else if run_y > 5 {
                        result += 1;
                    }
                } else {
                    history.add_history(run_y);
                    if !run_color {
                        result += history.count_patterns() * PENALTY_N3;
                    }
                    run_color = matrix.is_dark(x, y);
                    run_y = 1;
                }
            }
            result += history.terminate_and_count(run_color, run_y) * PENALTY_N3;
        }

        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let color = matrix.is_dark(x, y);
                if color == matrix.is_dark(x + 1, y) && color == matrix.is_dark(x, y + 1) && color == matrix.is_dark(x + 1, y + 1) {
                    result += PENALTY_N2;
                }
            }
        }

        let dark: i32 = (0..size).map(|y| (0..size).filter(|&x| matrix.is_dark(x, y)).count() as i32).sum();
        let total = size * size;
        let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
        result += k * PENALTY_N4;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::NullDiagnostics;

    #[test]
    fn encodes_hello_world_at_v1_m() {
        let enc = Encoder::new(&NullDiagnostics);
        let opts = EncodeOptions {
            ecl: ErrorCorrectionLevel::Medium,
            mask: None,
            min_version: Version::new(1),
            max_version: Version::new(1),
            boost_ecl: false,
        };
        let qr = enc.encode_bytes(b"HELLO WORLD", &opts).unwrap();
        assert_eq!(qr.version.value(), 1);
        assert_eq!(qr.ecl, ErrorCorrectionLevel::Medium);
        assert_eq!(qr.dimension(), 21);
    }

    #[test]
    fn capacity_exceeded_reports_bit_counts() {
        let enc = Encoder::new(&NullDiagnostics);
        let opts = EncodeOptions {
            ecl: ErrorCorrectionLevel::High,
            mask: None,
            min_version: Version::new(1),
            max_version: Version::new(1),
            boost_ecl: false,
        };
        let huge = vec![b'A'; 200];
        let err = enc.encode_bytes(&huge, &opts).unwrap_err();
        assert!(matches!(err, QrEncodeError::CapacityExceeded { .. } | QrEncodeError::SegmentTooLong { .. }));
    }

    #[test]
    fn boost_ecl_never_decreases_requested_level() {
        let enc = Encoder::new(&NullDiagnostics);
        let opts = EncodeOptions {
            ecl: ErrorCorrectionLevel::Low,
            mask: None,
            min_version: Version::new(5),
            max_version: Version::new(5),
            boost_ecl: true,
        };
        let qr = enc.encode_bytes(b"0123456789", &opts).unwrap();
        assert!(qr.ecl >= ErrorCorrectionLevel::Low);
    }

    #[test]
    fn forced_mask_is_honored() {
        let enc = Encoder::new(&NullDiagnostics);
        let opts = EncodeOptions {
            ecl: ErrorCorrectionLevel::Medium,
            mask: Some(Mask::new(2)),
            min_version: Version::new(1),
            max_version: Version::new(1),
            boost_ecl: false,
        };
        let qr = enc.encode_bytes(b"HI", &opts).unwrap();
        assert_eq!(qr.mask, Mask::new(2));
    }
}
