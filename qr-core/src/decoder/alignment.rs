use crate::decoder::binarizer::BinaryImage;

// The alignment pattern is a 5x5 square: one dark module ring, one light
// ring, one dark center — a 1:1:1:1:1 run along any line through its
// center, as opposed to the finder's 1:1:3:1:1.
const RATIO_TOLERANCE: f64 = 0.25;

fn matches_alignment_ratio(run: &[u32; 5]) -> bool {
    let total: u32 = run.iter().sum();
    if total < 5 {
        return false;
    }
    let unit = total as f64 / 5.0;
    run.iter().all(|&w| (w as f64 - unit).abs() <= unit * RATIO_TOLERANCE)
}

/// Searches a square pixel window around `(hint_x, hint_y)` for an alignment
/// pattern center, scanning each row in the window for a 1:1:1:1:1 run and
/// confirming with a matching vertical run. Returns `None` if nothing in the window matches — the
/// caller then falls back to the unrefined affine/projective estimate.
pub fn locate_alignment_pattern(img: &BinaryImage, hint_x: f64, hint_y: f64, module_size: f64) -> Option<(f64, f64)> {
    let radius = (module_size * 3.0).max(4.0) as i64;
    let cx = hint_x.round() as i64;
    let cy = hint_y.round() as i64;

    let mut best: Option<(f64, f64, f64)> = None; // (x, y, distance to hint)
    let y_lo = (cy - radius).max(0);
    let y_hi = (cy + radius).min(i64::from(img.height()) - 1);
    for y in y_lo..=y_hi {
        let x_lo = (cx - radius).max(0);
        let x_hi = (cx + radius).min(i64::from(img.width()) - 1);
        if x_hi <= x_lo {
            continue;
        }
        let mut run = [0u32; 5];
        let mut run_idx = 0usize;
        let mut last = img.is_dark(x_lo as u32, y as u32);
        run[0] = 1;
        for x in (x_lo + 1)..=x_hi {
            let dark = img.is_dark(x as u32, y as u32);
            if dark == last {
                run[run_idx] += 1;
            } else {
                run_idx += 1;
                if run_idx == 5 {
                    if matches_alignment_ratio(&run) && last {
                        // last run just closed is index 4; center x is back
                        // from the current x by half the center run.
                        let center_x = x as f64 - run[4] as f64 / 2.0 - run[3] as f64 - run[2] as f64 / 2.0;
                        if let Some((vx, vy)) = confirm_vertical(img, center_x.round() as i64, y) {
                            let dist = ((vx - hint_x).powi(2) + (vy - hint_y).powi(2)).sqrt();
                            if best.map_or(true, |(_, _, d)| dist < d) {
                                best = Some((vx, vy, dist));
                            }
                        }
                    }
                    run.copy_within(1.., 0);
                    run_idx = 4;
                    run[4] = 1;
                } else {
                    run[run_idx] = 1;
                }
                last = dark;
            }
        }
    }

    best.map(|(x, y, _)| (x, y))
}

fn confirm_vertical(img: &BinaryImage, x: i64, y_hint: i64) -> Option<(f64, f64)> {
    if x < 0 || x as u32 >= img.width() {
        return None;
    }
    let x = x as u32;
    let h = i64::from(img.height());

    let mut y = y_hint;
    while y > 0 && img.is_dark(x, (y - 1) as u32) {
        y -= 1;
    }
    let top = y.max(0);
    let mut run = [0u32; 5];
    let mut run_idx = 0usize;
    let mut last = img.is_dark(x, top as u32);
    run[0] = 1;
    let mut yy = top + 1;
    while yy < h {
        let dark = img.is_dark(x, yy as u32);
        if dark == last {
            run[run_idx] += 1;
        } else {
            run_idx += 1;
            if run_idx == 5 {
                break;
            }
            run[run_idx] = 1;
            last = dark;
        }
        yy += 1;
    }
    if run_idx < 4 || !matches_alignment_ratio(&run) {
        return None;
    }
    let center_y = top as f64 + (run[0] + run[1]) as f64 + run[2] as f64 / 2.0;
    Some((x as f64, center_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_ratio_accepts_equal_run_widths() {
        assert!(matches_alignment_ratio(&[2, 2, 2, 2, 2]));
        assert!(!matches_alignment_ratio(&[1, 1, 5, 1, 1]));
    }
}
