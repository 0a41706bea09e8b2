//! Mode synthesis along a trajectory.

use num_complex::Complex64;

use crate::coefficients::DerivedCoefficients;
use crate::domain::{ModeWaveform, Trajectory};
use crate::error::{try_with_capacity, AppError};
use crate::models::{CartesianPoint, EobModel};

/// (2,2) mode and the per-sample quantities the calibration stages need.
#[derive(Debug, Clone, Default)]
pub struct SynthesizedMode {
    /// Strain-scaled samples (`amp0 * h22`).
    pub mode: ModeWaveform,
    /// Orbital frequency per sample.
    pub omega: Vec<f64>,
    /// `|h22|` in units of `M / R`.
    pub amplitude: Vec<f64>,
    /// Unwrapped phase of the mode.
    pub phase: Vec<f64>,
}

impl SynthesizedMode {
    pub fn len(&self) -> usize {
        self.mode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mode.is_empty()
    }
}

/// Synthesize the first `count` samples of `traj`.
pub fn synthesize<M: EobModel>(
    model: &M,
    coeffs: &DerivedCoefficients,
    traj: &Trajectory,
    count: usize,
) -> Result<SynthesizedMode, AppError> {
    let n = count.min(traj.len());
    let mut samples = try_with_capacity(n, "mode samples")?;
    let mut omega = try_with_capacity(n, "orbital frequency")?;
    let mut amplitude = try_with_capacity(n, "mode amplitude")?;
    let mut raw_phase = try_with_capacity(n, "mode phase")?;

    for state in &traj.states()[..n] {
        let w = model.orbital_frequency(state, coeffs);
        let v = w.cbrt();
        let ham = model.hamiltonian(&CartesianPoint::from_polar(state), coeffs);
        let h: Complex64 = model.mode_22(state, v, ham, coeffs);

        omega.push(w);
        amplitude.push(h.norm());
        raw_phase.push(h.arg());
        samples.push(h * coeffs.amp0);
    }

    Ok(SynthesizedMode {
        mode: ModeWaveform::new(samples),
        omega,
        amplitude,
        phase: unwrap_phase(&raw_phase),
    })
}

/// Remove the `2 pi` jumps of a sampled phase with a running wrap counter.
///
/// A jump larger than `pi` between consecutive samples is a wrap; the counter
/// moves by one in the direction that cancels the jump.
pub fn unwrap_phase(raw: &[f64]) -> Vec<f64> {
    let two_pi = 2.0 * std::f64::consts::PI;
    let mut out = Vec::with_capacity(raw.len());
    let mut counter: i64 = 0;
    let mut prev: Option<f64> = None;

    for &p in raw {
        let mut value = p + counter as f64 * two_pi;
        if let Some(last) = prev {
            if value - last > std::f64::consts::PI {
                counter -= 1;
                value -= two_pi;
            } else if last - value > std::f64::consts::PI {
                counter += 1;
                value += two_pi;
            }
        }
        out.push(value);
        prev = Some(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(x: f64) -> f64 {
        let two_pi = 2.0 * std::f64::consts::PI;
        let mut y = x % two_pi;
        if y > std::f64::consts::PI {
            y -= two_pi;
        } else if y <= -std::f64::consts::PI {
            y += two_pi;
        }
        y
    }

    #[test]
    fn unwrap_decreasing_phase() {
        let truth: Vec<f64> = (0..400).map(|i| -0.1 * i as f64).collect();
        let raw: Vec<f64> = truth.iter().map(|&x| wrap(x)).collect();
        let unwrapped = unwrap_phase(&raw);
        for (u, t) in unwrapped.iter().zip(&truth) {
            assert!((u - t).abs() < 1e-9, "{u} vs {t}");
        }
    }

    #[test]
    fn unwrap_increasing_phase() {
        let truth: Vec<f64> = (0..300).map(|i| 0.25 * i as f64).collect();
        let raw: Vec<f64> = truth.iter().map(|&x| wrap(x)).collect();
        let unwrapped = unwrap_phase(&raw);
        for (u, t) in unwrapped.iter().zip(&truth) {
            assert!((u - t).abs() < 1e-9);
        }
    }

    #[test]
    fn unwrap_empty_and_single() {
        assert!(unwrap_phase(&[]).is_empty());
        assert_eq!(unwrap_phase(&[0.5]), vec![0.5]);
    }
}
