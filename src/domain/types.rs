//! Shared domain types.
//!
//! Everything here is created and discarded within one generation call:
//!
//! - inputs (`BinaryParameters`, `GenerationConfig`)
//! - intermediate products (`DynamicsState`, `Trajectory`, `ModeWaveform`,
//!   `NqcCoefficients`, `RingdownMatchWindow`)
//! - outputs (`Polarizations`, `GenerationReport`)
//!
//! The serializable ones are also what the CLI exports as JSON.

use std::path::PathBuf;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::PostProcessingWarning;

/// Physical parameters of one binary. Immutable for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryParameters {
    /// Component masses in solar masses.
    pub mass1: f64,
    pub mass2: f64,
    /// Dimensionless aligned spin z-components, in `[-1, 1]`.
    pub spin1z: f64,
    pub spin2z: f64,
    /// Initial gravitational-wave frequency (Hz).
    pub f_min: f64,
    /// Output sample interval (s).
    pub delta_t: f64,
    /// Luminosity distance (m).
    pub distance: f64,
    /// Inclination of the orbital angular momentum to the line of sight (rad).
    pub inclination: f64,
}

impl BinaryParameters {
    /// Same system with the component labels exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            mass1: self.mass2,
            mass2: self.mass1,
            spin1z: self.spin2z,
            spin2z: self.spin1z,
            ..*self
        }
    }
}

/// Phase-space point of the reduced aligned-spin dynamics.
///
/// Units are mass-rescaled: `r` in M, momenta per reduced mass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DynamicsState {
    pub r: f64,
    pub phi: f64,
    pub pr: f64,
    pub pphi: f64,
}

impl DynamicsState {
    pub fn new(r: f64, phi: f64, pr: f64, pphi: f64) -> Self {
        Self { r, phi, pr, pphi }
    }

    pub fn from_array(y: &[f64; 4]) -> Self {
        Self::new(y[0], y[1], y[2], y[3])
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.r, self.phi, self.pr, self.pphi]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Uniformly sampled, time-ordered dynamics.
///
/// Invariant: `times` is strictly increasing with spacing `step`, and
/// `times.len() == states.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    step: f64,
    times: Vec<f64>,
    states: Vec<DynamicsState>,
}

impl Trajectory {
    pub fn new(step: f64, times: Vec<f64>, states: Vec<DynamicsState>) -> Self {
        debug_assert_eq!(times.len(), states.len());
        debug_assert!(times.windows(2).all(|w| w[1] > w[0]));
        Self { step, times, states }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[DynamicsState] {
        &self.states
    }

    pub fn state(&self, idx: usize) -> Option<&DynamicsState> {
        self.states.get(idx)
    }

    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    pub fn last(&self) -> Option<&DynamicsState> {
        self.states.last()
    }
}

/// Complex samples of the dominant (2,2) mode, one per trajectory sample
/// (plus any ringdown extension).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModeWaveform {
    pub samples: Vec<Complex64>,
}

impl ModeWaveform {
    pub fn new(samples: Vec<Complex64>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn amplitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|h| h.norm()).collect()
    }
}

/// Non-quasicircular correction coefficients.
///
/// `a*` act on the amplitude, `b*` on the phase. `a3s`, `a4`, `a5` come from
/// the calibration table; the rest are fit once per run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NqcCoefficients {
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub a3s: f64,
    pub a4: f64,
    pub a5: f64,
    pub b1: f64,
    pub b2: f64,
    pub b3: f64,
    pub b4: f64,
}

/// Times (M, relative to the start of the high-resolution pass) bounding the
/// ringdown hybridization.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RingdownMatchWindow {
    pub start: f64,
    pub end: f64,
    pub final_time: f64,
}

/// Plus/cross strain series sharing sample interval and epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polarizations {
    pub plus: Vec<f64>,
    pub cross: Vec<f64>,
    pub delta_t: f64,
    pub epoch: f64,
}

impl Polarizations {
    pub fn len(&self) -> usize {
        self.plus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plus.is_empty()
    }

    pub fn sample_time(&self, idx: usize) -> f64 {
        self.epoch + idx as f64 * self.delta_t
    }
}

/// Calibration constants and run options, threaded explicitly through the call.
///
/// The radii, lead time and comb size are calibration choices of the model,
/// not derived quantities, so they are configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Inspiral-plunge pass may stop only inside this separation (M).
    pub inspiral_stop_radius: f64,
    /// High-resolution pass stops at or inside this separation (M).
    pub ringdown_stop_radius: f64,
    /// Lead time (M) stepped back from the end of the low-resolution pass.
    pub hand_off_lead: f64,
    /// High-resolution sampling target: step ≤ M / `resample_target`.
    pub resample_target: f64,
    /// Width (M) of the ringdown match window.
    pub comb_size: f64,
    /// Integrator tolerances.
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Maximum integration time (s) per pass.
    pub max_time_seconds: f64,
    /// Maximum number of integrator steps (accepted + rejected) per pass.
    pub max_steps: u64,
    /// Bracket width (M) at which the peak bisection stops.
    pub peak_tolerance: f64,
    /// Number of quasinormal overtones in the ringdown basis.
    pub ringdown_overtones: usize,
    /// Ringdown extension past the final dynamics time, in damping times of
    /// the fundamental mode.
    pub ringdown_efolds: f64,
    /// Relative mismatch allowed between fit and inspiral at the window end.
    pub continuity_tolerance: f64,
    /// Write the diagnostic bundle to this directory when set.
    pub debug_dir: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            inspiral_stop_radius: 6.0,
            ringdown_stop_radius: 1.8,
            hand_off_lead: 50.0,
            resample_target: 50.0,
            comb_size: 7.5,
            abs_tol: 1.0e-10,
            rel_tol: 1.0e-9,
            max_time_seconds: 20.0,
            max_steps: 5_000_000,
            peak_tolerance: 1.0e-5,
            ringdown_overtones: 3,
            ringdown_efolds: 20.0,
            continuity_tolerance: 0.1,
            debug_dir: None,
        }
    }
}

/// Scalar results of one run, for diagnostics and reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub total_mass: f64,
    pub eta: f64,
    pub spin_param: f64,
    pub low_len: usize,
    pub high_len: usize,
    pub hybrid_len: usize,
    pub hand_off_index: usize,
    pub resample_factor: usize,
    /// Orbital-frequency peak (M, high-resolution clock).
    pub time_peak: f64,
    /// First turnover of the NQC-corrected amplitude, when one was found.
    pub amplitude_peak_time: Option<f64>,
    pub nqc: NqcCoefficients,
    pub window: RingdownMatchWindow,
    pub warnings: Vec<PostProcessingWarning>,
}

/// Output of a successful generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedWaveform {
    pub polarizations: Polarizations,
    pub report: GenerationReport,
}
