use crate::bit_buffer::get_bit;
use crate::ec_level::ErrorCorrectionLevel;
use crate::mask::Mask;
use crate::matrix::ModuleMatrix;
use crate::tables::alignment_pattern_positions;
use crate::version::Version;

/// Builds and reads the function-pattern skeleton shared by the encoder and
/// decoder: finder/timing/alignment placement, the data zig-zag path, and
/// format/version info coordinates. Stateless beyond the
/// version number; callers supply their own `ModuleMatrix`.
#[derive(Debug, Clone, Copy)]
pub struct SymbolLayout {
    version: Version,
}

impl SymbolLayout {
    pub fn new(version: Version) -> Self {
        Self { version }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Stamps finder, timing and alignment patterns, reserves the
    /// format-info and (if applicable) version-info areas, and sets the
    /// single always-dark module. Format/version bit values are not drawn
    /// yet — call `draw_format_bits`/`draw_version_bits` afterward.
    pub fn build_base_matrix(&self) -> ModuleMatrix {
        let dim = self.version.dimension();
        let mut m = ModuleMatrix::new(self.version);

        for i in 0..dim {
            m.set_pattern(6, i, i % 2 == 0);
            m.set_pattern(i, 6, i % 2 == 0);
        }

        self.draw_finder_pattern(&mut m, 3, 3);
        self.draw_finder_pattern(&mut m, dim - 4, 3);
        self.draw_finder_pattern(&mut m, 3, dim - 4);

        let align_pos = alignment_pattern_positions(self.version);
        let n = align_pos.len();
        for i in 0..n {
            for j in 0..n {
                if !(i == 0 && j == 0 || i == 0 && j == n - 1 || i == n - 1 && j == 0) {
                    self.draw_alignment_pattern(&mut m, align_pos[i], align_pos[j]);
                }
            }
        }

        // Dummy format/version bits (all zero): this reserves and fixes the
        // coordinates now, in the same pass as the other function patterns,
        // matching the standard's own description of format/version info
        // as function modules. The real bits are stamped later by the
        // encoder's mask search, or read back by the decoder before this
        // placeholder matters.
        self.draw_format_bits(&mut m, 0);
        self.draw_version_bits(&mut m, 0);
        // The always-dark module sits in the format-info band but, unlike
        // its neighbors, its color never varies — mark it pattern-checkable
        // after the dummy format draw sets it dark.
        m.set_pattern(8, dim - 8, true);

        m
    }

    fn draw_finder_pattern(&self, m: &mut ModuleMatrix, x: i32, y: i32) {
        let dim = self.version.dimension();
        for dy in -4..=4 {
            for dx in -4..=4 {
                let xx = x + dx;
                let yy = y + dy;
                if (0..dim).contains(&xx) && (0..dim).contains(&yy) {
                    let dist = dx.abs().max(dy.abs());
                    m.set_pattern(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&self, m: &mut ModuleMatrix, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                m.set_pattern(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    // Coordinates of the first 9 format-info bits (around the top-left finder).
    fn format_coords_a() -> [(i32, i32); 15] {
        [
            (8, 0), (8, 1), (8, 2), (8, 3), (8, 4), (8, 5),
            (8, 7), (8, 8), (7, 8),
            (5, 8), (4, 8), (3, 8), (2, 8), (1, 8), (0, 8),
        ]
    }

    // The mirrored second copy, split along the bottom-left/top-right finders.
    fn format_coords_b(dim: i32) -> [(i32, i32); 15] {
        [
            (dim - 1, 8), (dim - 2, 8), (dim - 3, 8), (dim - 4, 8),
            (dim - 5, 8), (dim - 6, 8), (dim - 7, 8), (dim - 8, 8),
            (8, dim - 7), (8, dim - 6), (8, dim - 5), (8, dim - 4),
            (8, dim - 3), (8, dim - 2), (8, dim - 1),
        ]
    }

    // The 18-bit version info block's coordinates (one of two symmetric
    // copies; the caller mirrors (x, y) -> (y, x) for the other).
    fn version_coords(dim: i32) -> [(i32, i32); 18] {
        let mut coords = [(0, 0); 18];
        for (i, c) in coords.iter_mut().enumerate() {
            let i = i as i32;
            *c = (dim - 11 + i % 3, i / 3);
        }
        coords
    }

    /// Draws both copies of the 15-bit format-info codeword (already BCH
    /// encoded and mask-XORed by the caller).
    pub fn draw_format_bits(&self, m: &mut ModuleMatrix, bits: u32) {
        let dim = self.version.dimension();
        for i in 0..6 {
            m.set_function(8, i, get_bit(bits, i));
        }
        m.set_function(8, 7, get_bit(bits, 6));
        m.set_function(8, 8, get_bit(bits, 7));
        m.set_function(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            m.set_function(14 - i, 8, get_bit(bits, i));
        }
        for i in 0..8 {
            m.set_function(dim - 1 - i, 8, get_bit(bits, i));
        }
        for i in 8..15 {
            m.set_function(8, dim - 15 + i, get_bit(bits, i));
        }
        m.set_function(8, dim - 8, true);
    }

    /// Reads the two format-info copies off a sampled matrix as raw 15-bit
    /// integers (before BCH correction), for the decoder's geometry stage.
    pub fn read_format_bits(&self, m: &ModuleMatrix) -> (u32, u32) {
        let dim = self.version.dimension();
        let mut a = 0u32;
        for (i, &(x, y)) in Self::format_coords_a().iter().enumerate() {
            a |= u32::from(m.is_dark(x, y)) << i;
        }
        let mut b = 0u32;
        for (i, &(x, y)) in Self::format_coords_b(dim).iter().enumerate() {
            b |= u32::from(m.is_dark(x, y)) << i;
        }
        (a, b)
    }

    /// Draws both copies of the 18-bit version-info codeword. No-op below v7.
    pub fn draw_version_bits(&self, m: &mut ModuleMatrix, bits: u32) {
        if !self.version.has_version_info() {
            return;
        }
        let dim = self.version.dimension();
        for (i, &(x, y)) in Self::version_coords(dim).iter().enumerate() {
            let bit = get_bit(bits, i as i32);
            m.set_function(x, y, bit);
            m.set_function(y, x, bit);
        }
    }

    /// Reads the two version-info copies off a sampled matrix, if this
    /// version carries one.
    pub fn read_version_bits(&self, m: &ModuleMatrix) -> Option<(u32, u32)> {
        if !self.version.has_version_info() {
            return None;
        }
        let dim = self.version.dimension();
        let mut a = 0u32;
        let mut b = 0u32;
        for (i, &(x, y)) in Self::version_coords(dim).iter().enumerate() {
            a |= u32::from(m.is_dark(x, y)) << i;
            b |= u32::from(m.is_dark(y, x)) << i;
        }
        Some((a, b))
    }

    /// The zig-zag sequence of data-module coordinates, in the order the
    /// codeword bitstream is drawn/read. `base` must already have function patterns and
    /// format/version reserves stamped (data-ness is read off it, not
    /// recomputed), but its bit *values* are irrelevant here.
    pub fn data_path(&self, base: &ModuleMatrix) -> Vec<(i32, i32)> {
        let dim = self.version.dimension();
        let mut path = Vec::with_capacity((dim * dim) as usize);
        let mut right = dim - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..dim {
                for j in 0..2 {
                    let x = right - j;
                    let upward = (right + 1) & 2 == 0;
                    let y = if upward { dim - 1 - vert } else { vert };
                    if base.is_data_module(x, y) {
                        path.push((x, y));
                    }
                }
            }
            right -= 2;
        }
        path
    }

    /// Flips every non-fixed module's color wherever the mask predicate is
    /// true, leaving function modules untouched. Idempotent under a second
    /// call with the same mask (XOR), as the encoder relies on during its
    /// automatic mask search.
    pub fn apply_mask(&self, m: &mut ModuleMatrix, mask: Mask) {
        let dim = self.version.dimension();
        for y in 0..dim {
            for x in 0..dim {
                if !m.get(x, y).fixed && mask.predicate(y, x) {
                    let cell = m.get_mut(x, y);
                    cell.dark = !cell.dark;
                }
            }
        }
    }
}
