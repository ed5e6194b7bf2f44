//! Immutable constants shared by the encoder and decoder: EC block layout,
//! alignment-pattern coordinates, and the standard's format/version BCH
//! codeword sets.

use std::sync::OnceLock;

use crate::ec_level::ErrorCorrectionLevel;
use crate::mask::Mask;
use crate::version::Version;

pub static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    // Version:  1   2   3   4   5   6   7   8   9  10  11  12  13  14  15  16  17  18  19  20  21  22  23  24  25  26  27  28  29  30  31  32  33  34  35  36  37  38  39  40
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

pub static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: ErrorCorrectionLevel) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

/// The number of modules available for data+EC codewords at a given version,
/// after all function patterns are excluded. Includes remainder bits, so
/// it might not be a multiple of 8.
pub fn num_raw_data_modules(ver: Version) -> usize {
    let v = usize::from(ver.value());
    let mut result: usize = (16 * v + 128) * v + 64;
    if v >= 2 {
        let num_align = v / 7 + 2;
        result -= (25 * num_align - 10) * num_align - 55;
        if v >= 7 {
            result -= 36;
        }
    }
    result
}

/// The EC block layout for a (version, ECL) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    pub blocks_group1: usize,
    pub data_cw_group1: usize,
    pub blocks_group2: usize,
    pub data_cw_group2: usize,
    pub ec_cw_per_block: usize,
}

impl BlockPlan {
    pub fn for_version_ecl(ver: Version, ecl: ErrorCorrectionLevel) -> Self {
        let num_blocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
        let ec_cw_per_block = table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
        let raw_cw = num_raw_data_modules(ver) / 8;
        let num_short_blocks = num_blocks - raw_cw % num_blocks;
        let short_block_len = raw_cw / num_blocks;
        let data_cw_short = short_block_len - ec_cw_per_block;
        let num_long_blocks = num_blocks - num_short_blocks;

        BlockPlan {
            blocks_group1: num_short_blocks,
            data_cw_group1: data_cw_short,
            blocks_group2: num_long_blocks,
            data_cw_group2: if num_long_blocks > 0 { data_cw_short + 1 } else { 0 },
            ec_cw_per_block,
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.blocks_group1 + self.blocks_group2
    }

    pub fn total_data_codewords(&self) -> usize {
        self.blocks_group1 * self.data_cw_group1 + self.blocks_group2 * self.data_cw_group2
    }

    pub fn total_codewords(&self) -> usize {
        self.total_data_codewords() + self.total_blocks() * self.ec_cw_per_block
    }
}

/// The number of 8-bit data codewords available at a (version, ECL) pair,
/// with remainder bits discarded.
pub fn num_data_codewords(ver: Version, ecl: ErrorCorrectionLevel) -> usize {
    BlockPlan::for_version_ecl(ver, ecl).total_data_codewords()
}

/// The total number of 8-bit codewords (data + EC) at a version
/// — independent of ECL.
pub fn num_raw_codewords(ver: Version) -> usize {
    num_raw_data_modules(ver) / 8
}

/// Ascending list of alignment-pattern center coordinates for this version,
/// used on both the x and y axes (empty for v=1). Positions
/// near the three finder corners are excluded by the caller, not here.
pub fn alignment_pattern_positions(ver: Version) -> Vec<i32> {
    let v = ver.value();
    if v == 1 {
        return vec![];
    }
    let size = ver.dimension();
    let num_align = i32::from(v) / 7 + 2;
    let step: i32 = if v == 32 {
        26
    } else {
        (i32::from(v) * 4 + num_align * 2 + 1) / (num_align * 2 - 2) * 2
    };
    let mut result: Vec<i32> = (0..num_align - 1).map(|i| size - 7 - i * step).collect();
    result.push(6);
    result.reverse();
    result
}

// --- Format / version BCH recovery tables ---------------------------------
//
// Rather than hand-transcribing the standard's published codeword tables,
// these are derived once from the same BCH generator computation the
// encoder uses to stamp format/version info, guaranteeing the
// decoder's recovery table is bit-exact with what this crate's own encoder
// produces, and (being a direct transcription of ISO/IEC 18004's generator
// polynomials 0x537 and 0x1F25) with the standard itself.

fn bch_format_codeword(data5: u32) -> u32 {
    let mut rem = data5;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    (data5 << 10 | rem) ^ 0x5412
}

fn bch_version_codeword(data6: u32) -> u32 {
    let mut rem = data6;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
    }
    data6 << 12 | rem
}

/// One of the 32 legal 15-bit format-info codewords, with its decoded
/// (ECL, mask) pair.
#[derive(Debug, Clone, Copy)]
pub struct FormatCodeword {
    pub codeword: u32,
    pub ecl: ErrorCorrectionLevel,
    pub mask: Mask,
}

static FORMAT_CODEWORDS: OnceLock<Vec<FormatCodeword>> = OnceLock::new();

pub fn all_format_codewords() -> &'static [FormatCodeword] {
    FORMAT_CODEWORDS.get_or_init(|| {
        let mut v = Vec::with_capacity(32);
        for ecl_bits in 0u8..4 {
            for mask_val in 0u8..8 {
                let data5 = u32::from(ecl_bits) << 3 | u32::from(mask_val);
                v.push(FormatCodeword {
                    codeword: bch_format_codeword(data5),
                    ecl: ErrorCorrectionLevel::from_format_bits(ecl_bits),
                    mask: Mask::new(mask_val),
                });
            }
        }
        v
    })
}

/// Recovers (ECL, mask) from a 15-bit observed format codeword, accepting
/// exact matches or the nearest codeword within Hamming distance 3.
pub fn recover_format(observed: u32) -> Option<(ErrorCorrectionLevel, Mask)> {
    let mut best: Option<(u32, &FormatCodeword)> = None;
    for fc in all_format_codewords() {
        let dist = (observed ^ fc.codeword).count_ones();
        if best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, fc));
        }
    }
    best.and_then(|(d, fc)| (d <= 3).then_some((fc.ecl, fc.mask)))
}

static VERSION_CODEWORDS: OnceLock<Vec<(u32, u8)>> = OnceLock::new();

pub fn all_version_codewords() -> &'static [(u32, u8)] {
    VERSION_CODEWORDS.get_or_init(|| {
        (7u8..=40)
            .map(|v| (bch_version_codeword(u32::from(v)), v))
            .collect()
    })
}

/// Recovers a version number from an 18-bit observed version codeword,
/// accepting exact matches or the nearest codeword within Hamming distance 3.
pub fn recover_version(observed: u32) -> Option<Version> {
    let mut best: Option<(u32, u8)> = None;
    for &(codeword, v) in all_version_codewords() {
        let dist = (observed ^ codeword).count_ones();
        if best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, v));
        }
    }
    best.and_then(|(d, v)| (d <= 3).then(|| Version::new(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_plan_partitions_data_codewords_exactly() {
        for v in 1..=40u8 {
            for &ecl in &[
                ErrorCorrectionLevel::Low,
                ErrorCorrectionLevel::Medium,
                ErrorCorrectionLevel::Quartile,
                ErrorCorrectionLevel::High,
            ] {
                let plan = BlockPlan::for_version_ecl(Version::new(v), ecl);
                assert_eq!(plan.total_data_codewords(), num_data_codewords(Version::new(v), ecl));
                assert_eq!(plan.total_codewords(), num_raw_codewords(Version::new(v)));
            }
        }
    }

    #[test]
    fn alignment_positions_empty_at_v1() {
        assert!(alignment_pattern_positions(Version::new(1)).is_empty());
        assert!(!alignment_pattern_positions(Version::new(2)).is_empty());
    }

    #[test]
    fn format_codewords_pairwise_distance_at_least_7() {
        let codewords = all_format_codewords();
        for (i, a) in codewords.iter().enumerate() {
            for b in &codewords[i + 1..] {
                assert!((a.codeword ^ b.codeword).count_ones() >= 7);
            }
        }
    }

    #[test]
    fn version_codewords_pairwise_distance_at_least_7() {
        let codewords = all_version_codewords();
        for (i, &(a, _)) in codewords.iter().enumerate() {
            for &(b, _) in &codewords[i + 1..] {
                assert!((a ^ b).count_ones() >= 7);
            }
        }
    }

    #[test]
    fn format_recovery_corrects_up_to_3_bit_flips() {
        let fc = &all_format_codewords()[5];
        let flipped = fc.codeword ^ 0b111; // flip 3 low bits
        let (ecl, mask) = recover_format(flipped).unwrap();
        assert_eq!(ecl, fc.ecl);
        assert_eq!(mask, fc.mask);
    }

    #[test]
    fn version_recovery_corrects_up_to_3_bit_flips() {
        let (codeword, v) = all_version_codewords()[3];
        let flipped = codeword ^ 0b111;
        assert_eq!(recover_version(flipped).unwrap().value(), v);
    }
}
