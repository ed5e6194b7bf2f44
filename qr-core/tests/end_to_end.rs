//! Literal end-to-end scenarios from the symbol-level test plan: a few
//! fixed inputs whose expected shape (version, dimension, mask, recovered
//! bytes) is pinned down rather than just "round-trips for some input".

use qr_core::decoder::pixel_source::RawBgrImage;
use qr_core::decoder::{DecodeOptions, Decoder};
use qr_core::diagnostics::NullDiagnostics;
use qr_core::ec_level::ErrorCorrectionLevel;
use qr_core::encoder::{EncodeOptions, Encoder};
use qr_core::layout::SymbolLayout;
use qr_core::mask::Mask;
use qr_core::tables::BlockPlan;
use qr_core::version::Version;

// Renders a QrCode's modules into an owned BGR buffer at an integer scale
// with a quiet zone, the same shape every decoder test in this workspace
// uses to avoid depending on qr-png for pixel fixtures.
fn render(get_module: impl Fn(i32, i32) -> bool, dim: i32, scale: u32, quiet: u32) -> RawBgrImage {
    let side = dim as u32 * scale + 2 * quiet * scale;
    let mut bgr = vec![255u8; (side * side * 3) as usize];
    for y in 0..dim {
        for x in 0..dim {
            if get_module(x, y) {
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
fn scenario_1_hello_world_alphanumeric_v1_m_mask5() {
    let enc = Encoder::new(&NullDiagnostics);
    let opts = EncodeOptions {
        ecl: ErrorCorrectionLevel::Medium,
        mask: Some(Mask::new(5)),
        min_version: Version::new(1),
        max_version: Version::new(1),
        boost_ecl: false,
    };
    let qr = enc.encode_bytes(b"HELLO WORLD", &opts).unwrap();
    assert_eq!(qr.version.value(), 1);
    assert_eq!(qr.mask, Mask::new(5));
    assert_eq!(qr.dimension(), 21);

    let img = render(|x, y| qr.get_module(x, y), qr.dimension(), 4, 4);
    let decoder = Decoder::new(&NullDiagnostics);
    let results = decoder.decode(&img, &DecodeOptions::default());
    assert!(results.iter().any(|d| d == b"HELLO WORLD"));
}

#[test]
fn scenario_2_url_byte_mode_v9_mask2_medium() {
    let payload = b"https://github.com/mohsen2hasani/QRCode";
    let enc = Encoder::new(&NullDiagnostics);
    let opts = EncodeOptions {
        ecl: ErrorCorrectionLevel::Medium,
        mask: Some(Mask::new(2)),
        min_version: Version::new(9),
        max_version: Version::new(9),
        boost_ecl: false,
    };
    let qr = enc.encode_bytes(payload, &opts).unwrap();
    assert_eq!(qr.version.value(), 9);
    assert_eq!(qr.dimension(), 53);
    assert_eq!(qr.ecl, ErrorCorrectionLevel::Medium);
    assert_eq!(qr.mask, Mask::new(2));

    let img = render(|x, y| qr.get_module(x, y), qr.dimension(), 3, 4);
    let decoder = Decoder::new(&NullDiagnostics);
    let results = decoder.decode(&img, &DecodeOptions::default());
    assert!(results.iter().any(|d| d == payload));
}

#[test]
fn scenario_3_numeric_ten_digits_v1_low_mask0() {
    let enc = Encoder::new(&NullDiagnostics);
    let opts = EncodeOptions {
        ecl: ErrorCorrectionLevel::Low,
        mask: Some(Mask::new(0)),
        min_version: Version::new(1),
        max_version: Version::new(1),
        boost_ecl: false,
    };
    let qr = enc.encode_bytes(b"0123456789", &opts).unwrap();
    assert_eq!(qr.version.value(), 1);

    let img = render(|x, y| qr.get_module(x, y), qr.dimension(), 4, 4);
    let decoder = Decoder::new(&NullDiagnostics);
    let results = decoder.decode(&img, &DecodeOptions::default());
    assert!(results.iter().any(|d| d == b"0123456789"));
}

#[test]
fn scenario_4_capacity_boundary_at_v9_medium() {
    let plan = BlockPlan::for_version_ecl(Version::new(9), ErrorCorrectionLevel::Medium);
    // Byte mode at v9 (bucket 0) spends a 4-bit mode indicator + an 8-bit
    // character count before the payload; capacity is in bytes, so the
    // largest single byte-mode segment that still fits is one byte short
    // of the block plan's raw data-codeword budget, minus that 12-bit header.
    let header_bits = 4 + 8;
    let max_payload_bytes = (plan.total_data_codewords() * 8 - header_bits) / 8;

    let enc = Encoder::new(&NullDiagnostics);
    let opts = EncodeOptions {
        ecl: ErrorCorrectionLevel::Medium,
        mask: None,
        min_version: Version::new(9),
        max_version: Version::new(9),
        boost_ecl: false,
    };

    // Lowercase forces byte mode (alphanumeric mode only covers uppercase).
    let exact = vec![b'a'; max_payload_bytes];
    assert!(enc.encode_bytes(&exact, &opts).is_ok());

    let over = vec![b'a'; max_payload_bytes + 1];
    assert!(enc.encode_bytes(&over, &opts).is_err());
}

#[test]
fn scenario_5_bounded_corruption_recovers_exact_payload_then_fails_past_capacity() {
    let version = Version::new(9);
    let ecl = ErrorCorrectionLevel::Medium;
    let payload = b"https://github.com/mohsen2hasani/QRCode";

    let enc = Encoder::new(&NullDiagnostics);
    let segs = qr_core::segment::Segment::make_segments(payload);
    let capacity_bits = qr_core::tables::num_data_codewords(version, ecl) * 8;
    let data_bits = qr_core::segment::Segment::get_total_bits(&segs, version).unwrap();
    assert!(data_bits <= capacity_bits);

    let opts = EncodeOptions {
        ecl,
        mask: Some(Mask::new(2)),
        min_version: version,
        max_version: version,
        boost_ecl: false,
    };
    let qr = enc.encode_bytes(payload, &opts).unwrap();

    let plan = BlockPlan::for_version_ecl(version, ecl);
    let layout = SymbolLayout::new(version);
    let base = layout.build_base_matrix();
    let path = layout.data_path(&base);

    // Column-major interleave order, matching the encoder's own
    // add_ecc_and_interleave: data columns (block0[0], block1[0], ...,
    // block0[1], ...) followed by EC columns. Recovers, for interleaved
    // codeword index `k`, the module coordinate it was drawn to.
    let longest_data_len = plan.data_cw_group2.max(plan.data_cw_group1);
    let block_data_len = |i: usize| if i < plan.blocks_group1 { plan.data_cw_group1 } else { plan.data_cw_group2 };
    let mut interleaved_to_block: Vec<(usize, usize)> = Vec::new(); // (block_index, byte_index_within_block)
    for col in 0..longest_data_len {
        for b in 0..plan.total_blocks() {
            if col < block_data_len(b) {
                interleaved_to_block.push((b, col));
            }
        }
    }
    for col in 0..plan.ec_cw_per_block {
        for b in 0..plan.total_blocks() {
            interleaved_to_block.push((b, block_data_len(b) + col));
        }
    }

    let target_block = 0usize;
    let byte_positions: Vec<usize> = interleaved_to_block
        .iter()
        .enumerate()
        .filter(|(_, &(b, _))| b == target_block)
        .map(|(k, _)| k)
        .collect();

    let render_with_flips = |flipped_bytes: &[usize]| -> RawBgrImage {
        let flip_bits: std::collections::HashSet<usize> = flipped_bytes
            .iter()
            .flat_map(|&byte_idx| (0..8).map(move |bit| byte_idx * 8 + bit))
            .collect();
        render(
            |x, y| {
                let module_is_dark = qr.get_module(x, y);
                if let Some(i) = path.iter().position(|&(px, py)| px == x && py == y) {
                    if flip_bits.contains(&i) {
                        return !module_is_dark;
                    }
                }
                module_is_dark
            },
            qr.dimension(),
            3,
            4,
        )
    };

    let tolerable = plan.ec_cw_per_block / 2;
    let flipped_ok: Vec<usize> = byte_positions.iter().take(tolerable).copied().collect();
    let img_ok = render_with_flips(&flipped_ok);
    let decoder = Decoder::new(&NullDiagnostics);
    let results_ok = decoder.decode(&img_ok, &DecodeOptions::default());
    assert!(results_ok.iter().any(|d| d == payload), "expected recovery under {tolerable} flipped data bytes in one block");

    let flipped_over: Vec<usize> = byte_positions.iter().take(tolerable + 1).copied().collect();
    let img_over = render_with_flips(&flipped_over);
    let results_over = decoder.decode(&img_over, &DecodeOptions::default());
    assert!(
        !results_over.iter().any(|d| d == payload),
        "expected no exact recovery once corruption exceeds ec_cw_per_block/2 in one block"
    );
}

#[test]
fn scenario_6_uniform_image_yields_no_symbols() {
    let img = RawBgrImage::new(100, 100, vec![255u8; 100 * 100 * 3]);
    let decoder = Decoder::new(&NullDiagnostics);
    assert!(decoder.decode(&img, &DecodeOptions::default()).is_empty());
}
