//! Damped-sinusoid ringdown basis and the hybridization blend.
//!
//! A quasinormal mode with complex frequency `w = omega + i / tau` contributes
//!
//! ```text
//! g(t; w) = exp(-(i omega + 1/tau) t)
//! ```
//!
//! where `t` is measured from the end of the match window (so `t <= 0` inside
//! the window and the basis grows backwards in time).

use num_complex::Complex64;

/// Evaluate one quasinormal basis function.
pub fn qnm_basis(t: f64, qnm: Complex64) -> Complex64 {
    (-Complex64::new(qnm.im, qnm.re) * t).exp()
}

/// Fill the real design rows for one complex sample.
///
/// Unknowns are `(Re C_0, Im C_0, Re C_1, Im C_1, ...)`; the first row holds
/// the real part of the model, the second the imaginary part.
///
/// # Panics
/// Panics if the rows are shorter than `2 * qnms.len()`.
pub fn fill_design_rows(t: f64, qnms: &[Complex64], re_row: &mut [f64], im_row: &mut [f64]) {
    for (k, w) in qnms.iter().enumerate() {
        let g = qnm_basis(t, *w);
        // (x + i y) g = (x g.re - y g.im) + i (x g.im + y g.re)
        re_row[2 * k] = g.re;
        re_row[2 * k + 1] = -g.im;
        im_row[2 * k] = g.im;
        im_row[2 * k + 1] = g.re;
    }
}

/// Sum of the basis functions weighted by `amplitudes`.
pub fn predict(t: f64, amplitudes: &[Complex64], qnms: &[Complex64]) -> Complex64 {
    amplitudes
        .iter()
        .zip(qnms)
        .map(|(c, w)| c * qnm_basis(t, *w))
        .sum()
}

/// Smooth weight rising from 0 at `x <= 0` to 1 at `x >= 1`.
pub fn blend_weight(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    0.5 * (1.0 - (std::f64::consts::PI * x).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_decays_forward_in_time() {
        let w = Complex64::new(0.55, 1.0 / 12.0);
        assert!((qnm_basis(0.0, w) - Complex64::new(1.0, 0.0)).norm() < 1e-15);
        let later = qnm_basis(12.0, w).norm();
        assert!((later - (-1.0_f64).exp()).abs() < 1e-12);
        assert!(qnm_basis(-5.0, w).norm() > 1.0);
    }

    #[test]
    fn phase_rotates_negatively() {
        let w = Complex64::new(0.5, 0.0);
        let g = qnm_basis(1.0, w);
        assert!((g.arg() + 0.5).abs() < 1e-12);
    }

    #[test]
    fn design_rows_reproduce_prediction() {
        let qnms = [Complex64::new(0.5, 0.1), Complex64::new(0.45, 0.3)];
        let amps = [Complex64::new(1.0, -2.0), Complex64::new(0.3, 0.7)];
        let t = -1.7;
        let mut re = [0.0; 4];
        let mut im = [0.0; 4];
        fill_design_rows(t, &qnms, &mut re, &mut im);
        let beta = [amps[0].re, amps[0].im, amps[1].re, amps[1].im];
        let re_val: f64 = re.iter().zip(beta).map(|(a, b)| a * b).sum();
        let im_val: f64 = im.iter().zip(beta).map(|(a, b)| a * b).sum();
        let expected = predict(t, &amps, &qnms);
        assert!((re_val - expected.re).abs() < 1e-12);
        assert!((im_val - expected.im).abs() < 1e-12);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend_weight(-1.0), 0.0);
        assert_eq!(blend_weight(0.0), 0.0);
        assert!((blend_weight(0.5) - 0.5).abs() < 1e-15);
        assert!((blend_weight(1.0) - 1.0).abs() < 1e-15);
        assert_eq!(blend_weight(3.0), 1.0);
    }
}
