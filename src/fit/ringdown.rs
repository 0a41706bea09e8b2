//! Quasinormal-mode ringdown attachment.
//!
//! A sum of damped sinusoids is least-squares fit to the corrected inspiral
//! mode over the match window, then blended in across the window and
//! continued past the end of the dynamics.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::{debug, warn};

use crate::domain::{ModeWaveform, RingdownMatchWindow};
use crate::error::{try_with_capacity, AppError, PostProcessingWarning};
use crate::math::{blend_weight, fill_design_rows, predict, solve_least_squares};

/// Match window ending at `time_peak - delta_t_peak`.
pub fn match_window(
    time_peak: f64,
    delta_t_peak: f64,
    comb_size: f64,
    final_time: f64,
) -> (RingdownMatchWindow, Option<PostProcessingWarning>) {
    let end = (time_peak - delta_t_peak).clamp(0.0, final_time);
    let (start, warning) = if comb_size < end {
        (end - comb_size, None)
    } else {
        (
            0.0,
            Some(PostProcessingWarning::CombTooWide {
                comb_size,
                available: end,
            }),
        )
    };
    (
        RingdownMatchWindow {
            start,
            end,
            final_time,
        },
        warning,
    )
}

/// Fitted amplitudes of the damped sinusoids, referenced to `t_ref`.
#[derive(Debug, Clone, PartialEq)]
pub struct RingdownFit {
    pub amplitudes: Vec<Complex64>,
    /// Frequencies in units of 1/M.
    pub qnms: Vec<Complex64>,
    pub t_ref: f64,
}

impl RingdownFit {
    pub fn eval(&self, t: f64) -> Complex64 {
        predict(t - self.t_ref, &self.amplitudes, &self.qnms)
    }
}

/// Least-squares fit of the damped sinusoids to `samples` on `[start, end]`.
pub fn fit_ringdown(
    times: &[f64],
    samples: &[Complex64],
    window: &RingdownMatchWindow,
    qnms: &[Complex64],
) -> Result<RingdownFit, AppError> {
    let lo = times.partition_point(|&t| t < window.start);
    let hi = times.partition_point(|&t| t <= window.end).min(samples.len());
    let rows = hi.saturating_sub(lo);
    let unknowns = 2 * qnms.len();
    if 2 * rows < unknowns || qnms.is_empty() {
        return Err(AppError::numerical(format!(
            "ringdown window [{:.3}, {:.3}] holds {rows} samples, too few for {} modes",
            window.start,
            window.end,
            qnms.len()
        )));
    }

    let mut x = DMatrix::<f64>::zeros(2 * rows, unknowns);
    let mut y = DVector::<f64>::zeros(2 * rows);
    let mut re_row = vec![0.0; unknowns];
    let mut im_row = vec![0.0; unknowns];
    for (row, i) in (lo..hi).enumerate() {
        fill_design_rows(times[i] - window.end, qnms, &mut re_row, &mut im_row);
        for col in 0..unknowns {
            x[(2 * row, col)] = re_row[col];
            x[(2 * row + 1, col)] = im_row[col];
        }
        y[2 * row] = samples[i].re;
        y[2 * row + 1] = samples[i].im;
    }

    // Scale to unit size so the singular-value cutoffs are meaningful.
    let scale = y.amax();
    if !(scale > 0.0) || !scale.is_finite() {
        return Err(AppError::numerical("ringdown window holds no signal"));
    }
    let beta = solve_least_squares(&x, &(y / scale))
        .ok_or_else(|| AppError::numerical("singular ringdown least-squares system"))?;

    let amplitudes = (0..qnms.len())
        .map(|k| Complex64::new(beta[2 * k], beta[2 * k + 1]) * scale)
        .collect();
    Ok(RingdownFit {
        amplitudes,
        qnms: qnms.to_vec(),
        t_ref: window.end,
    })
}

/// Hybridized mode plus the diagnostics of the attachment.
#[derive(Debug, Clone)]
pub struct AttachedRingdown {
    pub mode: ModeWaveform,
    pub fit: RingdownFit,
    pub warnings: Vec<PostProcessingWarning>,
}

/// Blend the ringdown into `mode` (sampled at `step` from t = 0).
///
/// Samples before the window are untouched, samples inside it are a smooth
/// blend rising from the inspiral to the fit, later samples are the fit
/// alone. The series is extended by `efolds` damping times of the slowest
/// decaying mode.
pub fn attach_ringdown(
    mode: &ModeWaveform,
    step: f64,
    window: &RingdownMatchWindow,
    qnms: &[Complex64],
    efolds: f64,
    continuity_tolerance: f64,
) -> Result<AttachedRingdown, AppError> {
    let times: Vec<f64> = (0..mode.len()).map(|i| i as f64 * step).collect();
    let fit = fit_ringdown(&times, &mode.samples, window, qnms)?;

    let slowest = qnms
        .iter()
        .map(|w| w.im)
        .fold(f64::INFINITY, f64::min);
    let extension = (efolds / (slowest * step)).ceil();
    if !extension.is_finite() || extension < 0.0 {
        return Err(AppError::numerical(format!("invalid ringdown extension {extension}")));
    }
    let total = mode.len() + extension as usize;

    let mut warnings = Vec::new();
    let end_idx = times.partition_point(|&t| t <= window.end).saturating_sub(1);
    if let Some(h_end) = mode.samples.get(end_idx) {
        let relative_error = (fit.eval(times[end_idx]) - h_end).norm() / h_end.norm();
        debug!(relative_error, "ringdown continuity at window end");
        if !(relative_error <= continuity_tolerance) {
            let w = PostProcessingWarning::RingdownMismatch { relative_error };
            warn!("{w}");
            warnings.push(w);
        }
    }

    let width = window.end - window.start;
    let mut out = try_with_capacity(total, "hybrid mode")?;
    for i in 0..total {
        let t = i as f64 * step;
        let h = if i >= mode.len() {
            fit.eval(t)
        } else if t < window.start {
            mode.samples[i]
        } else if t <= window.end {
            let w = if width > 0.0 { blend_weight((t - window.start) / width) } else { 1.0 };
            mode.samples[i] * (1.0 - w) + fit.eval(t) * w
        } else {
            fit.eval(t)
        };
        out.push(h);
    }

    Ok(AttachedRingdown {
        mode: ModeWaveform::new(out),
        fit,
        warnings,
    })
}
