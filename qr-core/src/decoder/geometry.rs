use crate::decoder::finder::Match;
use crate::error::QrDecodeError;

/// Maps module-space coordinates (u, v), with (0, 0) at the top-left data
/// module and integer steps of one module, to pixel-space coordinates
/// (x, y), via a general projective transform.
///
/// `x = (a*u + b*v + c) / (g*u + h*v + 1)`, and likewise for `y` with
/// `d, e, f`. An affine transform (the common case for a flat, perpendicular
/// scan) is just the degenerate case `g = h = 0`.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    coeffs: [f64; 8],
}

impl Transform {
    pub fn map(&self, u: f64, v: f64) -> (f64, f64) {
        let [a, b, c, d, e, f, g, h] = self.coeffs;
        let w = g * u + h * v + 1.0;
        ((a * u + b * v + c) / w, (d * u + e * v + f) / w)
    }

    /// Solves the 8-unknown projective system from 4 point correspondences
    /// via Gaussian elimination with partial pivoting.
    pub fn from_quad(module_pts: [(f64, f64); 4], pixel_pts: [(f64, f64); 4]) -> Result<Self, QrDecodeError> {
        // Two independent 4x4(+ shared denominator) systems collapse into one
        // 8x8 linear system: row 2i for x_i, row 2i+1 for y_i.
        let mut a = [[0.0f64; 9]; 8];
        for i in 0..4 {
            let (u, v) = module_pts[i];
            let (x, y) = pixel_pts[i];
            a[2 * i] = [u, v, 1.0, 0.0, 0.0, 0.0, -u * x, -v * x, x];
            a[2 * i + 1] = [0.0, 0.0, 0.0, u, v, 1.0, -u * y, -v * y, y];
        }
        let solved = gaussian_eliminate(&mut a).ok_or(QrDecodeError::LinearSolveFailure)?;
        Ok(Self { coeffs: solved })
    }

    /// The simpler 6-unknown affine case (no perspective term), solved from
    /// exactly 3 correspondences — used before an alignment pattern has been
    /// located to supply a 4th point.
    pub fn from_triangle(module_pts: [(f64, f64); 3], pixel_pts: [(f64, f64); 3]) -> Result<Self, QrDecodeError> {
        let mut ax = [[0.0f64; 4]; 3];
        let mut ay = [[0.0f64; 4]; 3];
        for i in 0..3 {
            let (u, v) = module_pts[i];
            let (x, y) = pixel_pts[i];
            ax[i] = [u, v, 1.0, x];
            ay[i] = [u, v, 1.0, y];
        }
        let sx = gaussian_eliminate_n::<3>(&mut ax).ok_or(QrDecodeError::LinearSolveFailure)?;
        let sy = gaussian_eliminate_n::<3>(&mut ay).ok_or(QrDecodeError::LinearSolveFailure)?;
        Ok(Self { coeffs: [sx[0], sx[1], sx[2], sy[0], sy[1], sy[2], 0.0, 0.0] })
    }
}

// Solves an 8x8 linear system stored as augmented rows (9 columns each).
fn gaussian_eliminate(a: &mut [[f64; 9]; 8]) -> Option<[f64; 8]> {
    let n = 8;
    for col in 0..n {
        let pivot = (col..n).max_by(|&r1, &r2| a[r1][col].abs().partial_cmp(&a[r2][col].abs()).unwrap())?;
        if a[pivot][col].abs() < 1e-9 {
            return None;
        }
        a.swap(col, pivot);
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col] / a[col][col];
            for k in col..=n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }
    let mut result = [0.0; 8];
    for i in 0..n {
        result[i] = a[i][n] / a[i][i];
    }
    Some(result)
}

// Same algorithm, generic over a smaller system size (used for the 3x3
// affine solves, one per output dimension).
fn gaussian_eliminate_n<const N: usize>(a: &mut [[f64; 4]; N]) -> Option<[f64; N]> {
    for col in 0..N {
        let pivot = (col..N).max_by(|&r1, &r2| a[r1][col].abs().partial_cmp(&a[r2][col].abs()).unwrap())?;
        if a[pivot][col].abs() < 1e-9 {
            return None;
        }
        a.swap(col, pivot);
        for row in 0..N {
            if row == col {
                continue;
            }
            let factor = a[row][col] / a[col][col];
            for k in col..=N {
                a[row][k] -= factor * a[col][k];
            }
        }
    }
    let mut result = [0.0; N];
    for i in 0..N {
        result[i] = a[i][N] / a[i][i];
    }
    Some(result)
}

/// Builds the initial affine transform for a finder triple, with the 4th
/// ("bottom-right") point extrapolated as a parallelogram completion — used
/// only to seed the alignment pattern search before a real 4th point exists.
pub fn affine_from_match(m: &Match, dimension: i32) -> Result<Transform, QrDecodeError> {
    let d = f64::from(dimension);
    let module_pts = [(3.0, 3.0), (d - 4.0, 3.0), (3.0, d - 4.0)];
    let pixel_pts = [
        (m.top_left.x, m.top_left.y),
        (m.top_right.x, m.top_right.y),
        (m.bottom_left.x, m.bottom_left.y),
    ];
    Transform::from_triangle(module_pts, pixel_pts)
}

/// The predicted pixel location of the bottom-right alignment pattern,
/// completing the parallelogram from the three finder centers.
pub fn predict_alignment_pixel(m: &Match) -> (f64, f64) {
    (
        m.top_right.x + m.bottom_left.x - m.top_left.x,
        m.top_right.y + m.bottom_left.y - m.top_left.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::finder::Finder;

    #[test]
    fn affine_round_trips_an_unrotated_square() {
        let m = Match {
            top_left: Finder { x: 10.0, y: 10.0, module_size: 4.0 },
            top_right: Finder { x: 10.0 + 4.0 * 18.0, y: 10.0, module_size: 4.0 },
            bottom_left: Finder { x: 10.0, y: 10.0 + 4.0 * 18.0, module_size: 4.0 },
        };
        let t = affine_from_match(&m, 21).unwrap();
        let (x, y) = t.map(3.0, 3.0);
        assert!((x - 10.0).abs() < 1e-6);
        assert!((y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn projective_transform_recovers_identity_square() {
        let module_pts = [(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)];
        let pixel_pts = [(100.0, 100.0), (300.0, 100.0), (300.0, 300.0), (100.0, 300.0)];
        let t = Transform::from_quad(module_pts, pixel_pts).unwrap();
        let (x, y) = t.map(10.0, 10.0);
        assert!((x - 200.0).abs() < 1e-6);
        assert!((y - 200.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_points_report_linear_solve_failure() {
        let module_pts = [(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)];
        let pixel_pts = [(0.0, 0.0), (0.0, 0.0), (0.0, 0.0), (0.0, 0.0)];
        assert!(Transform::from_quad(module_pts, pixel_pts).is_err());
    }
}
