use crate::version::Version;

/// A single module of a symbol: its color, and two bookkeeping flags used
/// while the layout stage stamps function patterns before data/mask are
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    /// `true` = dark, `false` = light.
    pub dark: bool,
    /// Set for modules belonging to a function pattern (finder, timing,
    /// alignment, format/version info) or the single fixed dark module.
    /// Fixed modules are never subjected to masking.
    pub fixed: bool,
    /// Set for modules that never carry payload bits: fixed modules plus
    /// the format/version reserves (which are drawn separately, not through
    /// the codeword zig-zag).
    pub non_data: bool,
    /// Set for true function-pattern modules (finder, timing, alignment,
    /// the single always-dark module) whose color is determined purely by
    /// version/position, not by data, mask or format/version content. The
    /// decoder's fixed-pattern validation checks only these cells, since
    /// format/version reserve cells carry real (unpredictable) content.
    pub pattern: bool,
}

/// A square grid of modules with a small guard border of permanently-light
/// cells around the symbol proper, so the decoder's geometry and alignment
/// stages can sample one or two modules outside the nominal D x D area
/// (e.g. the separator ring, or an alignment search overshooting by a
/// module due to perspective noise) without bounds-checking every access.
#[derive(Debug, Clone)]
pub struct ModuleMatrix {
    dimension: i32,
    border: i32,
    stride: i32,
    cells: Vec<Cell>,
}

impl ModuleMatrix {
    pub const BORDER: i32 = 2;

    pub fn new(ver: Version) -> Self {
        let dimension = ver.dimension();
        let stride = dimension + 2 * Self::BORDER;
        Self {
            dimension,
            border: Self::BORDER,
            stride,
            cells: vec![Cell::default(); (stride * stride) as usize],
        }
    }

    pub fn dimension(&self) -> i32 {
        self.dimension
    }

    fn index(&self, x: i32, y: i32) -> usize {
        let bx = x + self.border;
        let by = y + self.border;
        debug_assert!((0..self.stride).contains(&bx) && (0..self.stride).contains(&by));
        (by * self.stride + bx) as usize
    }

    /// Reads the cell at (x, y), where (0, 0) is the symbol's top-left data
    /// module. Coordinates within the guard border (negative, or >=
    /// dimension up to `BORDER`) are valid and read as light/non-fixed.
    pub fn get(&self, x: i32, y: i32) -> Cell {
        if x < -self.border
            || y < -self.border
            || x >= self.dimension + self.border
            || y >= self.dimension + self.border
        {
            return Cell::default();
        }
        self.cells[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> &mut Cell {
        let i = self.index(x, y);
        &mut self.cells[i]
    }

    pub fn set_function(&mut self, x: i32, y: i32, dark: bool) {
        let cell = self.get_mut(x, y);
        cell.dark = dark;
        cell.fixed = true;
        cell.non_data = true;
    }

    /// Like `set_function`, but also marks the module as a true, version-
    /// predictable function pattern (see `Cell::pattern`).
    pub fn set_pattern(&mut self, x: i32, y: i32, dark: bool) {
        self.set_function(x, y, dark);
        self.get_mut(x, y).pattern = true;
    }

    /// Marks (x, y) as reserved (format/version info) without committing a
    /// color yet; the layout stage stamps the actual bits afterward.
    pub fn reserve(&mut self, x: i32, y: i32) {
        let cell = self.get_mut(x, y);
        cell.non_data = true;
    }

    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        self.get(x, y).dark
    }

    /// Overwrites only the color of (x, y), leaving `fixed`/`non_data`/
    /// `pattern` untouched. Used by the decoder to paint sampled pixel
    /// colors onto a matrix whose structural flags came from
    /// `SymbolLayout::build_base_matrix`.
    pub fn set_sampled(&mut self, x: i32, y: i32, dark: bool) {
        self.get_mut(x, y).dark = dark;
    }

    pub fn is_data_module(&self, x: i32, y: i32) -> bool {
        (0..self.dimension).contains(&x) && (0..self.dimension).contains(&y) && !self.get(x, y).non_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_as_light() {
        let m = ModuleMatrix::new(Version::new(1));
        assert!(!m.is_dark(-2, -2));
        assert!(!m.is_dark(100, 100));
    }

    #[test]
    fn set_function_marks_fixed_and_non_data() {
        let mut m = ModuleMatrix::new(Version::new(1));
        m.set_function(0, 0, true);
        assert!(m.is_dark(0, 0));
        assert!(m.get(0, 0).fixed);
        assert!(!m.is_data_module(0, 0));
    }

    #[test]
    fn data_module_excludes_reserved_cells() {
        let mut m = ModuleMatrix::new(Version::new(1));
        assert!(m.is_data_module(10, 10));
        m.reserve(10, 10);
        assert!(!m.is_data_module(10, 10));
    }
}
