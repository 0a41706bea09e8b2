//! Remnant properties and (2,2,n) quasinormal-mode frequencies.

use num_complex::Complex64;

use crate::coefficients::DerivedCoefficients;
use crate::error::AppError;

/// Largest remnant spin magnitude fed to the QNM fits.
const MAX_FINAL_SPIN: f64 = 0.99;

/// `(f1, f2, f3, q1, q2, q3)` per overtone: `M_f omega = f1 + f2 (1 - j)^f3`,
/// `Q = q1 + q2 (1 - j)^q3`.
const QNM_FITS_22: [[f64; 6]; 3] = [
    [1.5251, -1.1568, 0.1292, 0.7000, 1.4187, -0.4990],
    [1.3673, -1.0260, 0.1628, 0.1000, 0.5436, -0.4731],
    [1.3223, -1.0257, 0.1860, -0.1000, 0.4206, -0.4256],
];

pub const MAX_OVERTONES: usize = QNM_FITS_22.len();

/// Remnant mass in units of the total mass.
pub fn final_mass_fraction(eta: f64) -> f64 {
    1.0 + ((8.0_f64 / 9.0).sqrt() - 1.0) * eta - 0.4333 * eta * eta - 0.4392 * eta * eta * eta
}

/// Dimensionless remnant spin, clamped to `[-0.99, 0.99]`.
pub fn final_spin(coeffs: &DerivedCoefficients) -> f64 {
    let eta = coeffs.eta;
    let q = coeffs.mass2 / coeffs.mass1;
    let q2 = q * q;
    let a_tilde = (coeffs.spin1z + coeffs.spin2z * q2) / (1.0 + q2);

    const S4: f64 = -0.1229;
    const S5: f64 = 0.4537;
    const T0: f64 = -2.8904;
    const T2: f64 = -3.5171;
    const T3: f64 = 2.5763;

    let af = a_tilde
        + S4 * a_tilde * a_tilde * eta
        + S5 * eta * eta * a_tilde
        + T0 * a_tilde * eta
        + 2.0 * 3.0_f64.sqrt() * eta
        + T2 * eta * eta
        + T3 * eta * eta * eta;
    af.clamp(-MAX_FINAL_SPIN, MAX_FINAL_SPIN)
}

/// Complex frequencies of the first `overtones` (2,2,n) modes in rad/s:
/// real part the angular frequency, imaginary part the inverse damping time.
pub fn qnm_frequencies(coeffs: &DerivedCoefficients, overtones: usize) -> Result<Vec<Complex64>, AppError> {
    if overtones == 0 || overtones > MAX_OVERTONES {
        return Err(AppError::input(format!(
            "ringdown overtones must be in 1..={MAX_OVERTONES}, got {overtones}"
        )));
    }
    let final_mass_s = final_mass_fraction(coeffs.eta) * coeffs.total_mass_seconds;
    let j = final_spin(coeffs);

    let mut out = Vec::with_capacity(overtones);
    for fit in QNM_FITS_22.iter().take(overtones) {
        let [f1, f2, f3, q1, q2, q3] = *fit;
        let omega = f1 + f2 * (1.0 - j).powf(f3);
        let quality = q1 + q2 * (1.0 - j).powf(q3);
        let tau = 2.0 * quality / omega;
        if !(omega > 0.0 && tau > 0.0) {
            return Err(AppError::numerical(format!(
                "unphysical quasinormal mode for final spin {j}: omega={omega}, tau={tau}"
            )));
        }
        out.push(Complex64::new(omega / final_mass_s, 1.0 / (tau * final_mass_s)));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::derive_coefficients;
    use crate::domain::BinaryParameters;

    fn coeffs(s1: f64, s2: f64) -> DerivedCoefficients {
        derive_coefficients(&BinaryParameters {
            mass1: 10.0,
            mass2: 10.0,
            spin1z: s1,
            spin2z: s2,
            f_min: 40.0,
            delta_t: 1.0 / 4096.0,
            distance: 1.0e24,
            inclination: 0.0,
        })
        .unwrap()
    }

    #[test]
    fn equal_mass_nonspinning_remnant() {
        let c = coeffs(0.0, 0.0);
        let af = final_spin(&c);
        assert!((af - 0.686).abs() < 0.01, "af = {af}");
        let mf = final_mass_fraction(0.25);
        assert!((mf - 0.95).abs() < 0.01, "mf = {mf}");
    }

    #[test]
    fn fundamental_mode_in_mass_units() {
        let c = coeffs(0.0, 0.0);
        let modes = qnm_frequencies(&c, 3).unwrap();
        let m = c.total_mass_seconds;
        let omega = modes[0].re * m;
        let tau = 1.0 / (modes[0].im * m);
        assert!((omega - 0.555).abs() < 0.02, "omega = {omega}");
        assert!(tau > 10.0 && tau < 14.0, "tau = {tau}");
        // Overtones decay faster.
        assert!(modes[1].im > modes[0].im);
        assert!(modes[2].im > modes[1].im);
    }

    #[test]
    fn extremal_spins_clamp_remnant() {
        let c = coeffs(1.0, 1.0);
        assert!(final_spin(&c) <= MAX_FINAL_SPIN);
        assert!(qnm_frequencies(&c, 3).unwrap().iter().all(|w| w.re.is_finite() && w.im > 0.0));
    }

    #[test]
    fn overtone_count_is_validated() {
        let c = coeffs(0.0, 0.0);
        assert!(matches!(qnm_frequencies(&c, 0), Err(AppError::Input(_))));
        assert!(matches!(qnm_frequencies(&c, 4), Err(AppError::Input(_))));
    }
}
