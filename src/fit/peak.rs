//! Orbital-frequency peak location on the high-resolution pass.

use tracing::debug;

use crate::error::AppError;
use crate::math::CubicSpline;

/// Time (same clock as `times`) at which `omega` peaks, refined by bisection
/// on the sign of the spline derivative until the bracket is narrower than
/// `tolerance`.
///
/// `Ok(None)` when the series never turns over.
pub fn locate_frequency_peak(times: &[f64], omega: &[f64], tolerance: f64) -> Result<Option<f64>, AppError> {
    let finite = omega.iter().position(|w| !w.is_finite()).unwrap_or(omega.len());
    let (times, omega) = (&times[..finite], &omega[..finite]);

    let Some(peak_idx) = (1..omega.len()).find(|&i| omega[i] <= omega[i - 1]) else {
        return Ok(None);
    };
    if omega.len() < 3 {
        return Ok(Some(times[peak_idx - 1]));
    }

    let spline = CubicSpline::new(times, omega)?;

    let (mut t1, mut t2) = if spline.derivative(times[peak_idx]) > 0.0 && peak_idx + 1 < times.len() {
        (times[peak_idx], times[peak_idx + 1])
    } else {
        (times[peak_idx - 1], times[peak_idx])
    };
    // Already falling at the left end: the maximum sits on that sample.
    if !(spline.derivative(t1) > 0.0) {
        debug!(peak_idx, time_peak = t1, "orbital frequency peak on a sample");
        return Ok(Some(t1));
    }

    while t2 - t1 > tolerance {
        let mid = 0.5 * (t1 + t2);
        if spline.derivative(mid) > 0.0 {
            t1 = mid;
        } else {
            t2 = mid;
        }
    }
    let time_peak = 0.5 * (t1 + t2);

    debug!(peak_idx, time_peak, "orbital frequency peak");
    Ok(Some(time_peak))
}
