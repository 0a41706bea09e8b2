//! Once-per-run coefficients derived from the binary parameters.
//!
//! Everything the Hamiltonian, flux and factorized-waveform formulas need is
//! assembled here exactly once; the bundles are read-only afterwards.

use std::f64::consts::PI;

use tracing::debug;

use crate::domain::units::{MRSUN_SI, MTSUN_SI};
use crate::domain::BinaryParameters;
use crate::error::AppError;

/// Inputs of the reduced spinning EOB Hamiltonian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HamiltonianCoeffs {
    pub eta: f64,
    /// Kerr parameter of the deformed background (`sigma_kerr.z`).
    pub a: f64,
    /// `sigma_star.z`, the test-spin part of the spin-orbit coupling.
    pub sigma_star: f64,
    /// Gravitomagnetic coupling: `H_SO = spin_orbit * pphi / r^3`.
    pub spin_orbit: f64,
}

/// PN coefficients of the factorized (2,2) mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformCoeffs {
    /// Newtonian prefix `-8 sqrt(pi/5) eta`.
    pub newtonian: f64,
    pub rho22v2: f64,
    pub rho22v3: f64,
    pub rho22v4: f64,
    pub rho22v5: f64,
    pub delta22vh3: f64,
    pub delta22vh6: f64,
    pub delta22v5: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedCoefficients {
    pub mass1: f64,
    pub mass2: f64,
    pub spin1z: f64,
    pub spin2z: f64,
    /// Total mass in solar masses.
    pub total_mass: f64,
    /// Total mass in seconds (`M G / c^3`).
    pub total_mass_seconds: f64,
    pub eta: f64,
    /// `(m1 - m2) / M`.
    pub delta: f64,
    pub chi_s: f64,
    pub chi_a: f64,
    pub sigma_kerr: [f64; 3],
    pub sigma_star: [f64; 3],
    /// Spin-magnitude parameter used by the calibration fits.
    pub spin_param: f64,
    /// Strain amplitude normalization `M * MRSUN / distance`.
    pub amp0: f64,
    pub hamiltonian: HamiltonianCoeffs,
    pub waveform: WaveformCoeffs,
}

impl DerivedCoefficients {
    /// Convert a duration in seconds to units of total mass.
    pub fn to_mass_units(&self, seconds: f64) -> f64 {
        seconds / self.total_mass_seconds
    }
}

/// Reject unphysical parameters before any work is done.
pub fn validate_parameters(params: &BinaryParameters) -> Result<(), AppError> {
    let positive = [
        ("mass1", params.mass1),
        ("mass2", params.mass2),
        ("f_min", params.f_min),
        ("delta_t", params.delta_t),
        ("distance", params.distance),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(AppError::input(format!("{name} must be finite and > 0, got {value}")));
        }
    }
    for (name, value) in [("spin1z", params.spin1z), ("spin2z", params.spin2z)] {
        if !(value.is_finite() && (-1.0..=1.0).contains(&value)) {
            return Err(AppError::input(format!("{name} must lie in [-1, 1], got {value}")));
        }
    }
    if !params.inclination.is_finite() {
        return Err(AppError::input("inclination must be finite"));
    }
    Ok(())
}

/// Compute mass ratios, spin combinations and all coefficient bundles.
pub fn derive_coefficients(params: &BinaryParameters) -> Result<DerivedCoefficients, AppError> {
    validate_parameters(params)?;

    let m1 = params.mass1;
    let m2 = params.mass2;
    let total_mass = m1 + m2;
    let eta = m1 * m2 / (total_mass * total_mass);
    let delta = (m1 - m2) / total_mass;

    // Aligned spins: only z-components survive.
    let chi_s = 0.5 * (params.spin1z + params.spin2z);
    let chi_a = 0.5 * (params.spin1z - params.spin2z);

    let s1 = [0.0, 0.0, params.spin1z * m1 * m1];
    let s2 = [0.0, 0.0, params.spin2z * m2 * m2];
    let m_sq = total_mass * total_mass;
    let mut sigma_kerr = [0.0; 3];
    let mut sigma_star = [0.0; 3];
    for i in 0..3 {
        sigma_kerr[i] = (s1[i] + s2[i]) / m_sq;
        sigma_star[i] = (m2 / m1 * s1[i] + m1 / m2 * s2[i]) / m_sq;
    }

    let a = sigma_kerr[2];
    if !a.is_finite() || !sigma_star[2].is_finite() {
        return Err(AppError::input(format!(
            "spin parameter is not finite (sigma_kerr={a}, sigma_star={})",
            sigma_star[2]
        )));
    }
    let a = a.clamp(-1.0, 1.0);

    let hamiltonian = HamiltonianCoeffs {
        eta,
        a,
        sigma_star: sigma_star[2],
        spin_orbit: 2.0 * a + 1.5 * sigma_star[2],
    };
    let waveform = waveform_coefficients(eta, delta, chi_s, chi_a);

    let coeffs = DerivedCoefficients {
        mass1: m1,
        mass2: m2,
        spin1z: params.spin1z,
        spin2z: params.spin2z,
        total_mass,
        total_mass_seconds: total_mass * MTSUN_SI,
        eta,
        delta,
        chi_s,
        chi_a,
        sigma_kerr,
        sigma_star,
        spin_param: a,
        amp0: total_mass * MRSUN_SI / params.distance,
        hamiltonian,
        waveform,
    };

    debug!(
        total_mass,
        eta,
        chi_s,
        chi_a,
        spin_param = a,
        "derived binary coefficients"
    );
    Ok(coeffs)
}

/// Factorized (2,2) coefficients. Spin enters through `chi_s`/`chi_a` only.
pub fn waveform_coefficients(eta: f64, delta: f64, chi_s: f64, chi_a: f64) -> WaveformCoeffs {
    let eta2 = eta * eta;
    let chi_s2 = chi_s * chi_s;
    let chi_a2 = chi_a * chi_a;

    WaveformCoeffs {
        newtonian: -8.0 * (PI / 5.0).sqrt() * eta,
        rho22v2: -43.0 / 42.0 + 55.0 * eta / 84.0,
        rho22v3: -2.0 * (chi_s + chi_a * delta - chi_s * eta) / 3.0,
        rho22v4: -20555.0 / 10584.0 - 33025.0 * eta / 21168.0 + 19583.0 * eta2 / 42336.0
            + 0.5 * (chi_s2 + chi_a2)
            + delta * chi_s * chi_a
            - 2.0 * eta * chi_a2,
        rho22v5: (-34.0 / 21.0 + 49.0 * eta / 18.0 + 209.0 * eta2 / 126.0) * chi_s
            + (-34.0 / 21.0 - 19.0 * eta / 42.0) * delta * chi_a,
        delta22vh3: 7.0 / 3.0,
        delta22vh6: 428.0 * PI / 105.0,
        delta22v5: -24.0 * eta,
    }
}
