use crate::bitstream::BitStreamReader;
use crate::decoder::binarizer::BinaryImage;
use crate::decoder::geometry::Transform;
use crate::ec_level::ErrorCorrectionLevel;
use crate::error::QrDecodeError;
use crate::gf256;
use crate::layout::SymbolLayout;
use crate::mask::Mask;
use crate::matrix::ModuleMatrix;
use crate::segment_mode::EncodingMode;
use crate::tables::{self, BlockPlan};
use crate::version::Version;
use crate::ALPHANUMERIC_CHARSET;

/// A fully decoded symbol's payload and the parameters recovered along the
/// way.
#[derive(Debug, Clone)]
pub struct ExtractedSymbol {
    pub version: Version,
    pub ecl: ErrorCorrectionLevel,
    pub mask: Mask,
    pub data: Vec<u8>,
}

/// Samples every module of a `version`-sized symbol through `transform`,
/// validates the true function patterns, recovers format/version info,
/// removes the mask, de-interleaves and RS-corrects the codewords, then
/// decodes the resulting bitstream into raw payload bytes.
///
/// Every failure mode here is meant to be caught by the caller and treated
/// as "this candidate geometry was wrong" rather than a hard decode failure
/// (the outer search retries the next finder triple/transform/alignment
/// guess).
pub fn extract(img: &BinaryImage, transform: &Transform, version: Version) -> Result<ExtractedSymbol, QrDecodeError> {
    let layout = SymbolLayout::new(version);
    let expected = layout.build_base_matrix();
    let dim = version.dimension();

    let mut sampled = expected.clone();
    for y in 0..dim {
        for x in 0..dim {
            let (px, py) = transform.map(f64::from(x) + 0.5, f64::from(y) + 0.5);
            sampled.set_sampled(x, y, sample_pixel(img, px, py)?);
        }
    }

    let (format_a, format_b) = layout.read_format_bits(&sampled);
    let (ecl, mask) = tables::recover_format(format_a)
        .or_else(|| tables::recover_format(format_b))
        .ok_or(QrDecodeError::FormatInfoUnrecoverable)?;

    validate_fixed_patterns(&expected, &sampled, dim, ecl.recovery_percent())?;

    if version.has_version_info() {
        if let Some((version_a, version_b)) = layout.read_version_bits(&sampled) {
            let recovered = tables::recover_version(version_a).or_else(|| tables::recover_version(version_b));
            if let Some(recovered) = recovered {
                if recovered != version {
                    return Err(QrDecodeError::VersionMismatch {
                        assumed: version.value(),
                        recovered: recovered.value(),
                    });
                }
            }
        }
    }

    layout.apply_mask(&mut sampled, mask);

    let raw_codewords = read_codewords(&layout, &sampled, version);
    let data_codewords = deinterleave_and_correct(&raw_codewords, version, ecl)?;
    let payload = decode_payload(&data_codewords, version)?;

    Ok(ExtractedSymbol { version, ecl, mask, data: payload })
}

fn sample_pixel(img: &BinaryImage, x: f64, y: f64) -> Result<bool, QrDecodeError> {
    let xi = x.round();
    let yi = y.round();
    if xi < 0.0 || yi < 0.0 || xi >= f64::from(img.width()) || yi >= f64::from(img.height()) {
        return Err(QrDecodeError::InvalidInputFormat(format!(
            "sample ({x}, {y}) falls outside the {}x{} image",
            img.width(),
            img.height()
        )));
    }
    Ok(img.is_dark(xi as u32, yi as u32))
}

// Compares every true function-pattern cell (Cell::pattern) against its
// known expected color. Format/version reserve cells are excluded: their
// content is real data, not a structural constant.
fn validate_fixed_patterns(
    expected: &ModuleMatrix,
    sampled: &ModuleMatrix,
    dim: i32,
    tolerance_percent: u32,
) -> Result<(), QrDecodeError> {
    let mut mismatched = 0usize;
    let mut total = 0usize;
    for y in 0..dim {
        for x in 0..dim {
            if expected.get(x, y).pattern {
                total += 1;
                if expected.is_dark(x, y) != sampled.is_dark(x, y) {
                    mismatched += 1;
                }
            }
        }
    }
    if total > 0 && mismatched * 100 > total * tolerance_percent as usize {
        return Err(QrDecodeError::FixedModuleMismatch { mismatched, total, tolerance_percent });
    }
    Ok(())
}

// Inverse of Encoder::draw_codewords: walks the same zig-zag path, but only
// as far as the real codewords go (trailing remainder-bit positions in the
// path are never part of a codeword and are discarded here).
fn read_codewords(layout: &SymbolLayout, sampled: &ModuleMatrix, version: Version) -> Vec<u8> {
    let path = layout.data_path(sampled);
    let num_codewords = tables::num_raw_codewords(version);
    let mut bytes = vec![0u8; num_codewords];
    for (i, &(x, y)) in path.iter().enumerate().take(num_codewords * 8) {
        if sampled.is_dark(x, y) {
            bytes[i >> 3] |= 1 << (7 - (i & 7));
        }
    }
    bytes
}

// Inverse of Encoder::add_ecc_and_interleave: splits the raw codeword
// stream back into per-block data+EC arrays along the same column-major
// interleave order, then RS-corrects each block in place.
fn deinterleave_and_correct(raw: &[u8], version: Version, ecl: ErrorCorrectionLevel) -> Result<Vec<u8>, QrDecodeError> {
    let plan = BlockPlan::for_version_ecl(version, ecl);
    let block_data_len = |i: usize| if i < plan.blocks_group1 { plan.data_cw_group1 } else { plan.data_cw_group2 };

    let mut blocks: Vec<Vec<u8>> = (0..plan.total_blocks())
        .map(|i| Vec::with_capacity(block_data_len(i) + plan.ec_cw_per_block))
        .collect();

    let mut cursor = 0usize;
    let longest_data_len = plan.data_cw_group2.max(plan.data_cw_group1);
    for i in 0..longest_data_len {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < block_data_len(b) {
                block.push(raw[cursor]);
                cursor += 1;
            }
        }
    }
    for _ in 0..plan.ec_cw_per_block {
        for block in blocks.iter_mut() {
            block.push(raw[cursor]);
            cursor += 1;
        }
    }

    let mut data_out = Vec::with_capacity(plan.total_data_codewords());
    for block in blocks.iter_mut() {
        gf256::correct(block, plan.ec_cw_per_block).ok_or(QrDecodeError::UncorrectableBlock { ec_len: plan.ec_cw_per_block })?;
        let data_len = block.len() - plan.ec_cw_per_block;
        data_out.extend_from_slice(&block[..data_len]);
    }
    Ok(data_out)
}

// Walks the mode-indicator/character-count/payload bit segments (the
// inverse of Segment::make_numeric/make_alphanumeric/make_bytes), stopping
// at a terminator or bitstream exhaustion. ECI designators are parsed and
// discarded, not applied (see the crate-level Open Question on ECI).
fn decode_payload(data: &[u8], version: Version) -> Result<Vec<u8>, QrDecodeError> {
    let mut reader = BitStreamReader::new(data);
    let mut out = Vec::new();

    loop {
        if reader.bits_remaining() < 4 {
            break;
        }
        let mode_bits = reader.read_bits(4).ok_or(QrDecodeError::PrematureEndOfData)?;
        let mode = EncodingMode::from_mode_bits(mode_bits).ok_or(QrDecodeError::UnsupportedMode(mode_bits))?;

        match mode {
            EncodingMode::Terminator => break,
            EncodingMode::Eci => {
                let first = reader.read_bits(8).ok_or(QrDecodeError::PrematureEndOfData)?;
                if first & 0x80 == 0 {
                    // single-byte designator, already fully consumed
                } else if first & 0xC0 == 0x80 {
                    reader.read_bits(8).ok_or(QrDecodeError::PrematureEndOfData)?;
                } else {
                    reader.read_bits(16).ok_or(QrDecodeError::PrematureEndOfData)?;
                }
            }
            EncodingMode::Numeric => {
                let count_bits = mode.num_char_count_bits(version);
                let mut count = reader.read_bits(count_bits).ok_or(QrDecodeError::PrematureEndOfData)? as usize;
                while count >= 3 {
                    let v = reader.read_bits(10).ok_or(QrDecodeError::PrematureEndOfData)?;
                    if v > 999 {
                        return Err(QrDecodeError::PrematureEndOfData);
                    }
                    out.push(b'0' + (v / 100) as u8);
                    out.push(b'0' + (v / 10 % 10) as u8);
                    out.push(b'0' + (v % 10) as u8);
                    count -= 3;
                }
                if count == 2 {
                    let v = reader.read_bits(7).ok_or(QrDecodeError::PrematureEndOfData)?;
                    if v > 99 {
                        return Err(QrDecodeError::PrematureEndOfData);
                    }
                    out.push(b'0' + (v / 10) as u8);
                    out.push(b'0' + (v % 10) as u8);
                } else if count == 1 {
                    let v = reader.read_bits(4).ok_or(QrDecodeError::PrematureEndOfData)?;
                    if v > 9 {
                        return Err(QrDecodeError::PrematureEndOfData);
                    }
                    out.push(b'0' + v as u8);
                }
            }
            EncodingMode::Alphanumeric => {
                let count_bits = mode.num_char_count_bits(version);
                let mut count = reader.read_bits(count_bits).ok_or(QrDecodeError::PrematureEndOfData)? as usize;
                while count >= 2 {
                    let v = reader.read_bits(11).ok_or(QrDecodeError::PrematureEndOfData)?;
                    if v > 44 * 45 + 44 {
                        return Err(QrDecodeError::PrematureEndOfData);
                    }
                    out.push(alphanumeric_char(v / 45)?);
                    out.push(alphanumeric_char(v % 45)?);
                    count -= 2;
                }
                if count == 1 {
                    let v = reader.read_bits(6).ok_or(QrDecodeError::PrematureEndOfData)?;
                    out.push(alphanumeric_char(v)?);
                }
            }
            EncodingMode::Byte => {
                let count_bits = mode.num_char_count_bits(version);
                let count = reader.read_bits(count_bits).ok_or(QrDecodeError::PrematureEndOfData)? as usize;
                for _ in 0..count {
                    let b = reader.read_bits(8).ok_or(QrDecodeError::PrematureEndOfData)?;
                    out.push(b as u8);
                }
            }
        }
    }

    Ok(out)
}

fn alphanumeric_char(index: u32) -> Result<u8, QrDecodeError> {
    ALPHANUMERIC_CHARSET
        .as_bytes()
        .get(index as usize)
        .copied()
        .ok_or(QrDecodeError::PrematureEndOfData)
}

/// Decodes a byte-mode payload as text in a caller-chosen charset — an
/// additive convenience on top of the mode-agnostic `data` field, since
/// this crate treats ECI as parse-only.
pub fn decode_to_string(data: &[u8], charset: &'static encoding_rs::Encoding) -> String {
    let (text, _, _) = charset.decode(data);
    text.into_owned()
}
