use crate::decoder::binarizer::BinaryImage;

/// A located finder pattern candidate: its estimated center and the module
/// width observed when it was detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finder {
    pub x: f64,
    pub y: f64,
    pub module_size: f64,
}

impl Finder {
    fn distance(&self, other: &Finder) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Three finders identified as plausibly belonging to the same symbol, with
/// roles assigned by their mutual geometry (corner formation feeds on
/// this ordering: top-left is the vertex of the right angle).
#[derive(Debug, Clone, Copy)]
pub struct Match {
    pub top_left: Finder,
    pub top_right: Finder,
    pub bottom_left: Finder,
}

// A run of 5 consecutive same/opposite-color segments along a scanline is a
// finder candidate iff its widths are in ratio 1:1:3:1:1 within this
// fractional tolerance.
const RATIO_TOLERANCE: f64 = 0.25;

fn matches_finder_ratio(run: &[u32; 5]) -> bool {
    let total: u32 = run.iter().sum();
    if total < 7 {
        return false;
    }
    let unit = total as f64 / 7.0;
    let expect = [unit, unit, unit * 3.0, unit, unit];
    run.iter()
        .zip(expect.iter())
        .all(|(&w, &e)| (w as f64 - e).abs() <= e * RATIO_TOLERANCE)
}

/// Scans every row for the finder's horizontal 1:1:3:1:1 dark/light/dark/
/// light/dark signature, then confirms + refines each hit with a vertical
/// scan through the same column.
pub fn locate_finders(img: &BinaryImage) -> Vec<Finder> {
    let mut candidates = Vec::new();
    let (w, h) = (img.width(), img.height());

    for y in 0..h {
        let mut run = [0u32; 5];
        let mut run_idx = 0usize;
        let mut last_color = img.is_dark(0, y);
        run[0] = 1;
        for x in 1..w {
            let dark = img.is_dark(x, y);
            if dark == last_color {
                run[run_idx] += 1;
            } else {
                if run_idx == 4 {
                    if matches_finder_ratio(&run) {
                        let center_x = x as f64 - (run[4] + run[3] + run[2] / 2) as f64;
                        if let Some(f) = confirm_vertical(img, center_x.round() as i64, y as i64, &run) {
                            candidates.push(f);
                        }
                    }
                    // Slide the window left by one run rather than resetting,
                    // so overlapping candidates on the same scanline aren't missed.
                    run.copy_within(1.., 0);
                    run[4] = 1;
                } else {
                    run_idx += 1;
                    run[run_idx] = 1;
                }
                last_color = dark;
            }
        }
    }

    dedupe(candidates)
}

fn confirm_vertical(img: &BinaryImage, x: i64, y_hint: i64, horiz_run: &[u32; 5]) -> Option<Finder> {
    if x < 0 || x as u32 >= img.width() {
        return None;
    }
    let x = x as u32;
    let h = img.height();

    let mut run = [0u32; 5];
    let mut run_idx = 0usize;
    let mut y = y_hint;
    // Walk up from the scanline hit to the top of the central dark run.
    while y > 0 && img.is_dark(x, (y - 1) as u32) {
        y -= 1;
    }
    let top = y.max(0) as u32;
    let mut last_color = img.is_dark(x, top);
    run[0] = 1;
    let mut yy = top + 1;
    while yy < h {
        let dark = img.is_dark(x, yy);
        if dark == last_color {
            run[run_idx] += 1;
        } else {
            run_idx += 1;
            if run_idx == 5 {
                break;
            }
            run[run_idx] = 1;
            last_color = dark;
        }
        yy += 1;
    }
    if run_idx < 4 || !matches_finder_ratio(&run) {
        return None;
    }

    let module_size = (horiz_run.iter().sum::<u32>() as f64 / 7.0 + run.iter().sum::<u32>() as f64 / 7.0) / 2.0;
    let center_y = top as f64 + (run[0] + run[1]) as f64 + run[2] as f64 / 2.0;
    Some(Finder { x: x as f64, y: center_y, module_size })
}

fn dedupe(mut finders: Vec<Finder>) -> Vec<Finder> {
    let mut result: Vec<Finder> = Vec::new();
    finders.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
    for f in finders.drain(..) {
        if let Some(existing) = result.iter_mut().find(|e| e.distance(&f) < f.module_size.max(1.0) * 2.0) {
            existing.x = (existing.x + f.x) / 2.0;
            existing.y = (existing.y + f.y) / 2.0;
        } else {
            result.push(f);
        }
    }
    result
}

/// Groups located finders into plausible symbol triples: any 3 whose pairwise
/// distances and module sizes are consistent with a right-isoceles layout,
/// ranked by how close the largest two legs are to equal length.
pub fn group_finders(finders: &[Finder]) -> Vec<Match> {
    let mut matches = Vec::new();
    for i in 0..finders.len() {
        for j in 0..finders.len() {
            for k in 0..finders.len() {
                if i == j || j == k || i == k {
                    continue;
                }
                if let Some(m) = try_match(finders[i], finders[j], finders[k]) {
                    matches.push(m);
                }
            }
        }
    }
    matches
}

fn try_match(a: Finder, b: Finder, c: Finder) -> Option<Match> {
    // Classify `a` as the right-angle vertex (top-left) by comparing the
    // three pairwise distances: the two legs from the vertex are shorter
    // than the hypotenuse between the other two.
    let ab = a.distance(&b);
    let ac = a.distance(&c);
    let bc = b.distance(&c);
    let (vertex, p, q, hyp) = if bc > ab && bc > ac {
        (a, b, c, bc)
    } else if ac > ab && ac > bc {
        (b, a, c, ac)
    } else if ab > ac && ab > bc {
        (c, a, b, ab)
    } else {
        return None;
    };

    let leg1 = vertex.distance(&p);
    let leg2 = vertex.distance(&q);
    if leg1 < 1.0 || leg2 < 1.0 {
        return None;
    }
    let leg_ratio = leg1.max(leg2) / leg1.min(leg2);
    if leg_ratio > 1.6 {
        return None;
    }
    let expected_hyp = (leg1 * leg1 + leg2 * leg2).sqrt();
    if (hyp - expected_hyp).abs() > expected_hyp * 0.3 {
        return None;
    }

    // Orient by sign of the cross product: top-right is reached from the
    // vertex by turning clockwise relative to bottom-left in image
    // coordinates (y grows downward).
    let cross = (p.x - vertex.x) * (q.y - vertex.y) - (p.y - vertex.y) * (q.x - vertex.x);
    let (top_right, bottom_left) = if cross > 0.0 { (p, q) } else { (q, p) };

    Some(Match { top_left: vertex, top_right, bottom_left })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finder_ratio_accepts_canonical_7_module_run() {
        assert!(matches_finder_ratio(&[1, 1, 3, 1, 1]));
        assert!(matches_finder_ratio(&[3, 3, 9, 3, 3]));
    }

    #[test]
    fn finder_ratio_rejects_uniform_run() {
        assert!(!matches_finder_ratio(&[5, 5, 5, 5, 5]));
    }

    #[test]
    fn group_finders_assigns_right_angle_vertex_as_top_left() {
        let tl = Finder { x: 10.0, y: 10.0, module_size: 1.0 };
        let tr = Finder { x: 50.0, y: 10.0, module_size: 1.0 };
        let bl = Finder { x: 10.0, y: 50.0, module_size: 1.0 };
        let matches = group_finders(&[tl, tr, bl]);
        assert!(matches.iter().any(|m| m.top_left == tl));
    }
}
