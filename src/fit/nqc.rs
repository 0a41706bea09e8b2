//! Non-quasicircular (NQC) correction.
//!
//! The correction multiplies the (2,2) mode by
//!
//! ```text
//! [1 + q (a1 + a2/r + (a3 + a3s)/r^1.5 + a4/r^2 + a5/r^2.5)]
//!   * exp(i [b1 p/(r Omega) + p^3/(r Omega) (b2 + b3/sqrt(r) + b4/r)])
//! q = (p / (r Omega))^2
//! ```
//!
//! `a3s`, `a4`, `a5`, `b3`, `b4` are tabulated; `a1..a3` and `b1, b2` are
//! solved so that the corrected amplitude and frequency match NR values (and
//! their time derivatives) at the match time.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use tracing::debug;

use crate::domain::{DynamicsState, ModeWaveform, NqcCoefficients, Trajectory};
use crate::error::{try_with_capacity, AppError};
use crate::math::{solve_square, CubicSpline};
use crate::models::PeakTargets;
use crate::wave::synth::SynthesizedMode;

/// Half-width (M) of the sample window used to build the matching splines.
const SPLINE_HALF_WIDTH: f64 = 5.0;
const MIN_SPLINE_KNOTS: usize = 5;

/// Correction factor for one sample.
pub fn nqc_factor(state: &DynamicsState, omega: f64, c: &NqcCoefficients) -> Complex64 {
    let r = state.r;
    let p = state.pr;
    let r_omega = r * omega;
    let sqrt_r = r.sqrt();
    let q = (p / r_omega) * (p / r_omega);

    let magnitude = 1.0
        + q * (c.a1
            + c.a2 / r
            + (c.a3 + c.a3s) / (r * sqrt_r)
            + c.a4 / (r * r)
            + c.a5 / (r * r * sqrt_r));
    let phase = c.b1 * p / r_omega + p * p * p / r_omega * (c.b2 + c.b3 / sqrt_r + c.b4 / r);
    Complex64::from_polar(1.0, phase) * magnitude
}

/// Indices `[lo, hi)` of the samples within `SPLINE_HALF_WIDTH` of `t`.
fn spline_window(times: &[f64], t: f64) -> Result<(usize, usize), AppError> {
    let n = times.len();
    if n < MIN_SPLINE_KNOTS {
        return Err(AppError::numerical(format!(
            "high-resolution pass too short for NQC matching ({n} samples)"
        )));
    }
    let mut lo = times.partition_point(|&x| x < t - SPLINE_HALF_WIDTH);
    let mut hi = times.partition_point(|&x| x <= t + SPLINE_HALF_WIDTH);
    while hi - lo < MIN_SPLINE_KNOTS {
        if lo > 0 {
            lo -= 1;
        }
        if hi < n {
            hi += 1;
        }
    }
    Ok((lo, hi))
}

/// Value, first and second derivative at `t` of the spline through `(x, y)`.
fn jet(x: &[f64], y: &[f64], t: f64) -> Result<[f64; 3], AppError> {
    let s = CubicSpline::new(x, y)?;
    Ok([s.eval(t), s.derivative(t), s.second_derivative(t)])
}

/// Solve for `a1..a3`, `b1`, `b2`; the tabulated terms are taken from `table`.
pub fn fit_nqc_coefficients(
    traj: &Trajectory,
    synth: &SynthesizedMode,
    targets: &PeakTargets,
    table: NqcCoefficients,
    match_time: f64,
) -> Result<NqcCoefficients, AppError> {
    // Past the point where the orbital frequency vanishes the NQC basis is singular.
    let usable = synth
        .omega
        .iter()
        .position(|w| !(*w > 0.0))
        .unwrap_or(synth.len());
    let times = &traj.times()[..usable];
    let (lo, hi) = spline_window(times, match_time)?;
    let x = &times[lo..hi];

    let len = hi - lo;
    let mut q1 = Vec::with_capacity(len);
    let mut q2 = Vec::with_capacity(len);
    let mut q3 = Vec::with_capacity(len);
    let mut known_amp = Vec::with_capacity(len);
    let mut p1 = Vec::with_capacity(len);
    let mut p2 = Vec::with_capacity(len);
    let mut known_phase = Vec::with_capacity(len);

    for i in lo..hi {
        let state = &traj.states()[i];
        let r = state.r;
        let p = state.pr;
        let sqrt_r = r.sqrt();
        let r_omega = r * synth.omega[i];
        let q = (p / r_omega) * (p / r_omega);
        let amp = synth.amplitude[i];

        q1.push(amp * q);
        q2.push(amp * q / r);
        q3.push(amp * q / (r * sqrt_r));
        known_amp.push(
            amp * (1.0 + q * (table.a3s / (r * sqrt_r) + table.a4 / (r * r) + table.a5 / (r * r * sqrt_r))),
        );

        let p3 = p * p * p / r_omega;
        p1.push(p / r_omega);
        p2.push(p3);
        known_phase.push(synth.phase[i] + p3 * (table.b3 / sqrt_r + table.b4 / r));
    }

    let jq1 = jet(x, &q1, match_time)?;
    let jq2 = jet(x, &q2, match_time)?;
    let jq3 = jet(x, &q3, match_time)?;
    let ja = jet(x, &known_amp, match_time)?;

    let amp_matrix = DMatrix::from_fn(3, 3, |row, col| [jq1, jq2, jq3][col][row]);
    let amp_rhs = DVector::from_row_slice(&[
        targets.amplitude - ja[0],
        targets.amplitude_dot - ja[1],
        targets.amplitude_ddot - ja[2],
    ]);
    let a = solve_square(amp_matrix, &amp_rhs)
        .ok_or_else(|| AppError::numerical("singular NQC amplitude system"))?;

    let jp1 = jet(x, &p1, match_time)?;
    let jp2 = jet(x, &p2, match_time)?;
    let jphi = jet(x, &known_phase, match_time)?;

    // Corrected frequency is -d(phase)/dt.
    let phase_matrix = DMatrix::from_row_slice(2, 2, &[jp1[1], jp2[1], jp1[2], jp2[2]]);
    let phase_rhs = DVector::from_row_slice(&[-targets.omega - jphi[1], -targets.omega_dot - jphi[2]]);
    let b = solve_square(phase_matrix, &phase_rhs)
        .ok_or_else(|| AppError::numerical("singular NQC phase system"))?;

    let fitted = NqcCoefficients {
        a1: a[0],
        a2: a[1],
        a3: a[2],
        b1: b[0],
        b2: b[1],
        ..table
    };
    debug!(?fitted, match_time, "NQC coefficients");
    Ok(fitted)
}

/// Apply the correction to the first `mode.len()` samples of `traj`.
pub fn apply_nqc(
    mode: &ModeWaveform,
    traj: &Trajectory,
    omega: &[f64],
    coeffs: &NqcCoefficients,
) -> Result<ModeWaveform, AppError> {
    let mut out = try_with_capacity(mode.len(), "NQC-corrected mode")?;
    for ((h, state), w) in mode.samples.iter().zip(traj.states()).zip(omega) {
        out.push(h * nqc_factor(state, *w, coeffs));
    }
    Ok(ModeWaveform::new(out))
}

/// Time of the first decrease of `|h|^2`, i.e. the sample before it.
pub fn find_amplitude_peak(times: &[f64], mode: &ModeWaveform) -> Option<f64> {
    let amp2: Vec<f64> = mode.samples.iter().map(|h| h.norm_sqr()).collect();
    (1..amp2.len())
        .find(|&i| amp2[i] < amp2[i - 1])
        .map(|i| times[i - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic(n: usize, step: f64) -> (Trajectory, SynthesizedMode) {
        // A plunge-like sequence with a growing radial momentum.
        let times: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
        let states: Vec<DynamicsState> = times
            .iter()
            .map(|t| DynamicsState::new(6.0 - 0.1 * t, 0.2 * t, -0.01 - 0.01 * t, 3.0 - 0.02 * t))
            .collect();
        let omega: Vec<f64> = times.iter().map(|t| 0.07 + 0.002 * t).collect();
        let amplitude: Vec<f64> = times.iter().map(|t| 0.2 + 0.004 * t + 0.0002 * t * t).collect();
        let phase: Vec<f64> = times.iter().map(|t| -0.14 * t - 0.002 * t * t).collect();
        let samples = amplitude
            .iter()
            .zip(&phase)
            .map(|(a, p)| Complex64::from_polar(*a, *p))
            .collect();
        (
            Trajectory::new(step, times, states),
            SynthesizedMode {
                mode: ModeWaveform::new(samples),
                omega,
                amplitude,
                phase,
            },
        )
    }

    #[test]
    fn zero_coefficients_leave_mode_unchanged() {
        let state = DynamicsState::new(3.0, 0.0, -0.3, 2.8);
        let f = nqc_factor(&state, 0.15, &NqcCoefficients::default());
        assert!((f - Complex64::new(1.0, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn fitted_correction_hits_targets() {
        let (traj, synth) = synthetic(2000, 0.02);
        let targets = PeakTargets {
            amplitude: 0.4,
            amplitude_dot: 0.0,
            amplitude_ddot: -0.001,
            omega: 0.36,
            omega_dot: 0.011,
        };
        let t_match = 20.0;
        let table = NqcCoefficients {
            a4: 0.1,
            ..NqcCoefficients::default()
        };
        let c = fit_nqc_coefficients(&traj, &synth, &targets, table, t_match).unwrap();
        assert_eq!(c.a4, 0.1);

        let corrected = apply_nqc(&synth.mode, &traj, &synth.omega, &c).unwrap();
        let times = traj.times();
        let amp: Vec<f64> = corrected.samples.iter().map(|h| h.norm()).collect();
        let phase = crate::wave::synth::unwrap_phase(
            &corrected.samples.iter().map(|h| h.arg()).collect::<Vec<_>>(),
        );
        let amp_s = CubicSpline::new(times, &amp).unwrap();
        let phase_s = CubicSpline::new(times, &phase).unwrap();
        assert!((amp_s.eval(t_match) - targets.amplitude).abs() < 1e-6);
        assert!(amp_s.derivative(t_match).abs() < 1e-5);
        assert!((-phase_s.derivative(t_match) - targets.omega).abs() < 1e-5);
    }

    #[test]
    fn amplitude_peak_is_first_turnover() {
        let times: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let amps = [1.0, 2.0, 3.0, 3.5, 3.2, 3.0, 3.1, 2.0, 1.0, 0.5];
        let mode = ModeWaveform::new(amps.iter().map(|a| Complex64::new(*a, 0.0)).collect());
        assert_eq!(find_amplitude_peak(&times, &mode), Some(3.0));

        let rising = ModeWaveform::new((0..5).map(|i| Complex64::new(i as f64, 0.0)).collect());
        assert_eq!(find_amplitude_peak(&times[..5], &rising), None);
    }

    #[test]
    fn short_pass_is_rejected() {
        let (traj, synth) = synthetic(3, 0.02);
        let targets = PeakTargets {
            amplitude: 0.4,
            amplitude_dot: 0.0,
            amplitude_ddot: 0.0,
            omega: 0.36,
            omega_dot: 0.011,
        };
        let err = fit_nqc_coefficients(&traj, &synth, &targets, NqcCoefficients::default(), 0.02).unwrap_err();
        assert!(matches!(err, AppError::Numerical(_)));
    }
}
