//! Physics collaborators of the generator.
//!
//! The orchestration code is generic over [`EobModel`]; the numerics it needs
//! (Hamiltonian, equations of motion, factorized mode, calibration and
//! quasinormal-mode tables, harmonics) come through this trait so that the
//! pipeline can be exercised with a substitute model.
//!
//! [`ReducedSeobModel`] is the built-in implementation.

pub mod calibration;
pub mod factorized;
pub mod hamiltonian;
pub mod harmonics;
pub mod initial;
pub mod ringdown;

use num_complex::Complex64;

use crate::coefficients::DerivedCoefficients;
use crate::domain::{BinaryParameters, DynamicsState, NqcCoefficients};
use crate::error::AppError;

pub use calibration::PeakTargets;
pub use hamiltonian::CartesianPoint;

pub trait EobModel {
    /// Starting point of the inspiral at `f_min`.
    fn initial_conditions(
        &self,
        params: &BinaryParameters,
        coeffs: &DerivedCoefficients,
    ) -> Result<DynamicsState, AppError>;

    /// Real Hamiltonian per reduced mass at a Cartesian phase-space point.
    fn hamiltonian(&self, point: &CartesianPoint, coeffs: &DerivedCoefficients) -> f64;

    /// `d(r, phi, pr, pphi)/dt`. May return non-finite components.
    fn derivatives(&self, state: &DynamicsState, coeffs: &DerivedCoefficients) -> [f64; 4];

    fn orbital_frequency(&self, state: &DynamicsState, coeffs: &DerivedCoefficients) -> f64;

    /// Unscaled (2,2) mode (units of `M / R`).
    fn mode_22(
        &self,
        state: &DynamicsState,
        v: f64,
        hamiltonian: f64,
        coeffs: &DerivedCoefficients,
    ) -> Complex64;

    fn peak_targets(&self, coeffs: &DerivedCoefficients) -> PeakTargets;

    fn calibrated_nqc(&self, coeffs: &DerivedCoefficients) -> NqcCoefficients;

    /// Calibrated offset (M) between the frequency and amplitude peaks.
    fn peak_delta_t(&self, coeffs: &DerivedCoefficients) -> f64;

    /// `(2,2,n)` frequencies in rad/s, `re = omega`, `im = 1 / tau`.
    fn qnm_frequencies(
        &self,
        coeffs: &DerivedCoefficients,
        overtones: usize,
    ) -> Result<Vec<Complex64>, AppError>;

    fn spin_weighted_harmonic(
        &self,
        l: i32,
        m: i32,
        inclination: f64,
        phase: f64,
    ) -> Result<Complex64, AppError>;
}

/// Reduced spinning EOB model: Kerr-deformed potential with a
/// gravitomagnetic spin-orbit term, radiation reaction from the factorized
/// (2,2) flux.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReducedSeobModel;

impl EobModel for ReducedSeobModel {
    fn initial_conditions(
        &self,
        params: &BinaryParameters,
        coeffs: &DerivedCoefficients,
    ) -> Result<DynamicsState, AppError> {
        initial::initial_state(params, coeffs)
    }

    fn hamiltonian(&self, point: &CartesianPoint, coeffs: &DerivedCoefficients) -> f64 {
        let (r, pr, pphi) = point.to_polar();
        let c = &coeffs.hamiltonian;
        hamiltonian::real_from_effective(hamiltonian::effective_hamiltonian(r, pr, pphi, c), c.eta)
    }

    fn derivatives(&self, state: &DynamicsState, coeffs: &DerivedCoefficients) -> [f64; 4] {
        let p = hamiltonian::partials(state, &coeffs.hamiltonian);
        let omega = p.d_pphi;
        let h22 = factorized::mode_22(state, omega.cbrt(), p.h_real, coeffs);
        let flux = factorized::flux_22(omega, h22);

        let dpphi = -flux / (coeffs.eta * omega);
        let dpr = -p.d_r + state.pr / state.pphi * dpphi;
        [p.d_pr, omega, dpr, dpphi]
    }

    fn orbital_frequency(&self, state: &DynamicsState, coeffs: &DerivedCoefficients) -> f64 {
        hamiltonian::partials(state, &coeffs.hamiltonian).d_pphi
    }

    fn mode_22(
        &self,
        state: &DynamicsState,
        v: f64,
        hamiltonian: f64,
        coeffs: &DerivedCoefficients,
    ) -> Complex64 {
        factorized::mode_22(state, v, hamiltonian, coeffs)
    }

    fn peak_targets(&self, coeffs: &DerivedCoefficients) -> PeakTargets {
        calibration::peak_targets(coeffs)
    }

    fn calibrated_nqc(&self, coeffs: &DerivedCoefficients) -> NqcCoefficients {
        calibration::calibrated_nqc(coeffs)
    }

    fn peak_delta_t(&self, coeffs: &DerivedCoefficients) -> f64 {
        calibration::peak_delta_t(coeffs)
    }

    fn qnm_frequencies(
        &self,
        coeffs: &DerivedCoefficients,
        overtones: usize,
    ) -> Result<Vec<Complex64>, AppError> {
        ringdown::qnm_frequencies(coeffs, overtones)
    }

    fn spin_weighted_harmonic(
        &self,
        l: i32,
        m: i32,
        inclination: f64,
        phase: f64,
    ) -> Result<Complex64, AppError> {
        harmonics::spin_weighted_harmonic(l, m, inclination, phase)
    }
}
