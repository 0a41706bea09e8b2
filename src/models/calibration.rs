//! Numerical-relativity calibration fits used by the NQC and ringdown stages.

use serde::{Deserialize, Serialize};

use crate::coefficients::DerivedCoefficients;
use crate::domain::NqcCoefficients;

/// NR values of the (2,2) mode at its amplitude peak, in units of `M`.
///
/// `amplitude_dot` is zero by definition of the peak and kept for the
/// symmetry of the matching equations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakTargets {
    pub amplitude: f64,
    pub amplitude_dot: f64,
    pub amplitude_ddot: f64,
    /// GW frequency `-d(phase)/dt`.
    pub omega: f64,
    pub omega_dot: f64,
}

pub fn peak_targets(coeffs: &DerivedCoefficients) -> PeakTargets {
    let eta = coeffs.eta;
    let a = coeffs.spin_param;
    let eta2 = eta * eta;

    PeakTargets {
        amplitude: eta * (1.422 + 0.3013 * eta + 1.246 * eta2) * (1.0 + 0.1 * a),
        amplitude_dot: 0.0,
        amplitude_ddot: -0.01 * eta * (0.1679 + 1.44 * eta - 2.001 * eta2),
        omega: (0.2733 + 0.2316 * eta + 0.4463 * eta2) * (1.0 + 0.3 * a),
        omega_dot: (0.005862 + 0.01506 * eta + 0.02625 * eta2) * (1.0 + 0.3 * a),
    }
}

/// Spin-dependent NQC terms that are tabulated rather than fit.
pub fn calibrated_nqc(coeffs: &DerivedCoefficients) -> NqcCoefficients {
    let eta = coeffs.eta;
    let a = coeffs.spin_param;
    let asym = (1.0 - 4.0 * eta).max(0.0).sqrt();

    NqcCoefficients {
        a3s: -0.3 * a * asym,
        a4: -0.5 * a * eta,
        a5: 0.3 * a * a * eta,
        ..NqcCoefficients::default()
    }
}

/// Offset (M) of the (2,2) amplitude peak before the orbital-frequency peak.
pub fn peak_delta_t(coeffs: &DerivedCoefficients) -> f64 {
    let a = coeffs.spin_param;
    if a <= 0.0 {
        2.5
    } else {
        2.5 + 1.77 * (a / 0.43655).powi(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::derive_coefficients;
    use crate::domain::BinaryParameters;

    fn coeffs(m1: f64, m2: f64, s: f64) -> DerivedCoefficients {
        derive_coefficients(&BinaryParameters {
            mass1: m1,
            mass2: m2,
            spin1z: s,
            spin2z: s,
            f_min: 40.0,
            delta_t: 1.0 / 4096.0,
            distance: 1.0e24,
            inclination: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn equal_mass_targets() {
        let t = peak_targets(&coeffs(10.0, 10.0, 0.0));
        assert!((t.amplitude - 0.3938).abs() < 1e-3);
        assert!((t.omega - 0.3591).abs() < 1e-3);
        assert!(t.amplitude_ddot < 0.0);
    }

    #[test]
    fn nonspinning_table_is_zero() {
        assert_eq!(calibrated_nqc(&coeffs(30.0, 10.0, 0.0)), NqcCoefficients::default());
    }

    #[test]
    fn delta_t_grows_with_aligned_spin() {
        assert_eq!(peak_delta_t(&coeffs(10.0, 10.0, -0.5)), 2.5);
        assert_eq!(peak_delta_t(&coeffs(10.0, 10.0, 0.0)), 2.5);
        assert!(peak_delta_t(&coeffs(10.0, 10.0, 0.5)) > 2.5);
    }
}
