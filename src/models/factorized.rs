//! Factorized resummed (2,2) mode and the energy flux built from it.
//!
//! `h22 = h_Newt * S_eff * T22 * exp(i delta22) * rho22^2`, in units of
//! `M / R` (multiply by `amp0` for strain).

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::coefficients::DerivedCoefficients;
use crate::domain::units::EULER_GAMMA;
use crate::domain::DynamicsState;
use crate::models::hamiltonian::effective_from_real;

const ZETA3: f64 = 1.202_056_903_159_594_3;
const ZETA5: f64 = 1.036_927_755_143_37;
const ZETA7: f64 = 1.008_349_277_381_922_8;

/// `r0 = 2M / sqrt(e)` in the tail logarithm.
const TAIL_R0: f64 = 1.213_061_319_425_267;

/// Tail factor `T22 = Gamma(3 - 2 i k) exp(pi k) exp(2 i k ln(4 Omega r0)) / Gamma(3)`
/// with `k = 2 Omega E`.
pub fn tail_factor(omega: f64, energy: f64) -> Complex64 {
    let k = 2.0 * omega * energy;
    let y = 2.0 * k;

    // |Gamma(3 - iy)|^2 = (1 + y^2)(4 + y^2) * pi y / sinh(pi y).
    let pi_y = PI * y;
    let sinc = if pi_y.abs() < 1e-8 { 1.0 } else { pi_y / pi_y.sinh() };
    let gamma_abs = ((1.0 + y * y) * (4.0 + y * y) * sinc).sqrt();
    let magnitude = gamma_abs * (PI * k).exp() / 2.0;

    let y2 = y * y;
    let arg_gamma1 = EULER_GAMMA * y - y * y2 * (ZETA3 / 3.0 - y2 * (ZETA5 / 5.0 - y2 * ZETA7 / 7.0));
    let arg_gamma3 = -(y / 2.0).atan() - y.atan() + arg_gamma1;
    let log_phase = if omega.abs() > 0.0 {
        y * (4.0 * omega.abs() * TAIL_R0).ln()
    } else {
        0.0
    };

    Complex64::from_polar(magnitude, arg_gamma3 + log_phase)
}

/// Residual amplitude correction `rho22` as a polynomial in `v`.
pub fn rho22(v: f64, coeffs: &DerivedCoefficients) -> f64 {
    let w = &coeffs.waveform;
    1.0 + v * v * (w.rho22v2 + v * (w.rho22v3 + v * (w.rho22v4 + v * w.rho22v5)))
}

/// Residual phase `delta22`.
pub fn delta22(v: f64, vh3: f64, coeffs: &DerivedCoefficients) -> f64 {
    let w = &coeffs.waveform;
    let v5 = v * v * v * v * v;
    vh3 * (w.delta22vh3 + vh3 * w.delta22vh6) + w.delta22v5 * v5
}

/// Dimensionless (2,2) mode at one phase-space point.
///
/// `v` is the orbital velocity `Omega^(1/3)` and `hamiltonian` the real
/// Hamiltonian per reduced mass at the same point.
pub fn mode_22(state: &DynamicsState, v: f64, hamiltonian: f64, coeffs: &DerivedCoefficients) -> Complex64 {
    let eta = coeffs.eta;
    let omega = v * v * v;
    let energy = eta * hamiltonian;

    let newtonian = coeffs.waveform.newtonian * v * v * Complex64::from_polar(1.0, -2.0 * state.phi);
    let source = effective_from_real(hamiltonian, eta);
    let tail = tail_factor(omega, energy);
    let phase = delta22(v, energy * omega, coeffs);
    let rho = rho22(v, coeffs);

    newtonian * source * tail * Complex64::from_polar(rho * rho, phase)
}

/// GW energy flux carried by the `(2, +/-2)` pair: `Omega^2 |h22|^2 / (2 pi)`.
pub fn flux_22(omega: f64, h22: Complex64) -> f64 {
    omega * omega * h22.norm_sqr() / (2.0 * PI)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::derive_coefficients;
    use crate::domain::BinaryParameters;

    fn equal_mass() -> DerivedCoefficients {
        derive_coefficients(&BinaryParameters {
            mass1: 10.0,
            mass2: 10.0,
            spin1z: 0.0,
            spin2z: 0.0,
            f_min: 40.0,
            delta_t: 1.0 / 4096.0,
            distance: 1.0e24,
            inclination: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn tail_reduces_to_unity_at_zero_frequency() {
        let t = tail_factor(0.0, 1.0);
        assert!((t.re - 1.0).abs() < 1e-12);
        assert!(t.im.abs() < 1e-12);
    }

    #[test]
    fn tail_magnitude_grows_with_frequency() {
        let low = tail_factor(0.01, 0.98).norm();
        let high = tail_factor(0.1, 0.95).norm();
        assert!(low > 1.0);
        assert!(high > low);
    }

    #[test]
    fn weak_field_mode_is_close_to_newtonian() {
        let c = equal_mass();
        let r: f64 = 200.0;
        let omega: f64 = r.powf(-1.5);
        let v = omega.cbrt();
        let h = 1.0 / 0.25 * (1.0 - 0.25 / (2.0 * r)).max(0.0);
        let state = DynamicsState::new(r, 0.0, 0.0, r.sqrt());
        let mode = mode_22(&state, v, h, &c);
        let newt = c.waveform.newtonian.abs() * v * v;
        assert!((mode.norm() / newt - 1.0).abs() < 0.05);
    }

    #[test]
    fn mode_phase_follows_twice_orbital_phase() {
        let c = equal_mass();
        let v = 0.2_f64;
        let h = 3.95;
        let a = mode_22(&DynamicsState::new(25.0, 0.0, 0.0, 5.0), v, h, &c);
        let b = mode_22(&DynamicsState::new(25.0, 0.3, 0.0, 5.0), v, h, &c);
        let turn = (b / a).arg();
        assert!((turn + 0.6).abs() < 1e-12);
        assert!((a.norm() - b.norm()).abs() < 1e-15);
    }

    #[test]
    fn flux_is_quadratic_in_amplitude() {
        let h = Complex64::new(0.1, 0.0);
        let f1 = flux_22(0.05, h);
        let f2 = flux_22(0.05, h * 2.0);
        assert!((f2 / f1 - 4.0).abs() < 1e-12);
    }
}
