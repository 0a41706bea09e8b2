//! ASCII plotting of the plus polarization for terminal output.
//!
//! Fixed-size grid, deterministic output. Each column keeps the min and max
//! of the samples that fall into it, so long inspirals still show their
//! envelope instead of aliasing.

use crate::domain::Polarizations;

/// Render `h+` against time.
pub fn render_ascii_plot(pol: &Polarizations, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    if pol.len() < 2 {
        return "Plot: (not enough samples)\n".to_string();
    }

    let t_min = pol.sample_time(0);
    let t_max = pol.sample_time(pol.len() - 1);
    let (y_min, y_max) = y_range(&pol.plus).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let points = column_envelope(pol, t_min, t_max, width);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &points, t_min, t_max, y_min, y_max);

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[{t_min:.4}, {t_max:.4}] s | h+=[{y_min:.3e}, {y_max:.3e}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Per-column extremes, in time order.
fn column_envelope(pol: &Polarizations, t_min: f64, t_max: f64, width: usize) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(2 * width);
    // (column, index of min, index of max)
    let mut current: Option<(usize, usize, usize)> = None;

    let flush = |points: &mut Vec<(f64, f64)>, lo: usize, hi: usize| {
        let (first, second) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        points.push((pol.sample_time(first), pol.plus[first]));
        if second != first {
            points.push((pol.sample_time(second), pol.plus[second]));
        }
    };

    for (i, &y) in pol.plus.iter().enumerate() {
        if !y.is_finite() {
            continue;
        }
        let col = map_x(pol.sample_time(i), t_min, t_max, width);
        match current {
            Some((c, lo, hi)) if c == col => {
                let lo = if y < pol.plus[lo] { i } else { lo };
                let hi = if y > pol.plus[hi] { i } else { hi };
                current = Some((c, lo, hi));
            }
            Some((_, lo, hi)) => {
                flush(&mut points, lo, hi);
                current = Some((col, i, i));
            }
            None => current = Some((col, i, i)),
        }
    }
    if let Some((_, lo, hi)) = current {
        flush(&mut points, lo, hi);
    }
    points
}

fn y_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &y in values.iter().filter(|y| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(f64::MIN_POSITIVE);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y_max is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, '-'),
            None => grid[yy][x] = '-',
        }
        prev = Some((x, yy));
    }
}

/// Bresenham line; only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(plus: Vec<f64>, delta_t: f64) -> Polarizations {
        let cross = vec![0.0; plus.len()];
        Polarizations {
            plus,
            cross,
            delta_t,
            epoch: 0.0,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let pol = series(vec![0.0, 1.0, 0.0, -1.0], 1.0);
        let txt = render_ascii_plot(&pol, 10, 5);
        let expected = concat!(
            "Plot: t=[0.0000, 3.0000] s | h+=[-1.100e0, 1.100e0]\n",
            "   -      \n",
            " -- --    \n",
            "-     -   \n",
            "       -- \n",
            "         -\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn dense_series_keeps_its_envelope() {
        // Many oscillations per column: every column must reach both extremes.
        let plus: Vec<f64> = (0..2000).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let txt = render_ascii_plot(&series(plus, 1.0), 20, 7);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows.len(), 7);
        assert!(rows[0].chars().filter(|c| *c == '-').count() >= 19);
        assert!(rows[6].chars().filter(|c| *c == '-').count() >= 19);
    }

    #[test]
    fn short_series_is_reported() {
        let txt = render_ascii_plot(&series(vec![1.0], 1.0), 10, 5);
        assert!(txt.contains("not enough samples"));
    }
}
