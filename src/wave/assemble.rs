//! Splice the low-resolution and hybrid segments onto the output grid and
//! project onto the two polarizations.

use num_complex::Complex64;
use tracing::debug;

use crate::domain::{ModeWaveform, Polarizations};
use crate::error::{try_with_capacity, AppError};

/// Output length: the low-resolution pass plus the downsampled hybrid.
pub fn assembled_len(low_len: usize, hybrid_len: usize, resample_factor: usize) -> usize {
    low_len + hybrid_len.div_ceil(resample_factor)
}

/// Build the output-rate mode.
///
/// Indices `[0, hand_off)` come from `low` (which must hold at least that
/// many samples); from `hand_off` on, every `resample_factor`-th hybrid
/// sample. Anything past the hybrid is zero.
pub fn assemble_mode(
    low: &ModeWaveform,
    low_len: usize,
    hybrid: &ModeWaveform,
    hand_off: usize,
    resample_factor: usize,
) -> Result<ModeWaveform, AppError> {
    if resample_factor == 0 {
        return Err(AppError::numerical("resample factor must be positive"));
    }
    if low.len() < hand_off || hand_off > low_len {
        return Err(AppError::numerical(format!(
            "hand-off index {hand_off} outside the low-resolution segment ({} samples)",
            low.len()
        )));
    }

    let len = assembled_len(low_len, hybrid.len(), resample_factor);
    let mut out = try_with_capacity(len, "assembled mode")?;
    out.extend_from_slice(&low.samples[..hand_off]);
    out.extend(hybrid.samples.iter().step_by(resample_factor).copied());
    out.resize(len, Complex64::new(0.0, 0.0));

    debug!(len, hand_off, resample_factor, "assembled output mode");
    Ok(ModeWaveform::new(out))
}

/// `h+ - i hx` from the `m = +/-2` modes, with `h_{2,-2} = conj(h_22)`.
pub fn project_polarizations(
    mode: &ModeWaveform,
    y22: Complex64,
    y2m2: Complex64,
    delta_t: f64,
) -> Result<Polarizations, AppError> {
    let mut plus = try_with_capacity(mode.len(), "plus polarization")?;
    let mut cross = try_with_capacity(mode.len(), "cross polarization")?;

    let y1 = y22.re + y2m2.re;
    let y2 = y2m2.im - y22.im;
    let z1 = -y2m2.im - y22.im;
    let z2 = y2m2.re - y22.re;

    for h in &mode.samples {
        plus.push(h.re * y1 + h.im * y2);
        cross.push(h.re * z1 + h.im * z2);
    }

    Ok(Polarizations {
        plus,
        cross,
        delta_t,
        epoch: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, offset: f64) -> ModeWaveform {
        ModeWaveform::new((0..n).map(|i| Complex64::new(offset + i as f64, 0.0)).collect())
    }

    #[test]
    fn length_is_low_plus_ceil_hybrid() {
        assert_eq!(assembled_len(100, 1000, 128), 108);
        assert_eq!(assembled_len(100, 1024, 128), 108);
        assert_eq!(assembled_len(100, 1025, 128), 109);
        assert_eq!(assembled_len(10, 7, 1), 17);
    }

    #[test]
    fn splices_low_then_downsampled_hybrid() {
        let low = ramp(10, 0.0);
        let hybrid = ramp(20, 100.0);
        let out = assemble_mode(&low, 10, &hybrid, 6, 4).unwrap();
        assert_eq!(out.len(), assembled_len(10, 20, 4));
        let re: Vec<f64> = out.samples.iter().map(|h| h.re).collect();
        assert_eq!(&re[..6], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(&re[6..11], &[100.0, 104.0, 108.0, 112.0, 116.0]);
        assert!(re[11..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn hand_off_past_low_segment_is_rejected() {
        let low = ramp(3, 0.0);
        assert!(assemble_mode(&low, 10, &ramp(5, 0.0), 5, 1).is_err());
    }

    #[test]
    fn face_on_projection_is_circular() {
        let y22 = Complex64::new(0.63, 0.0);
        let y2m2 = Complex64::new(0.0, 0.0);
        let mode = ModeWaveform::new(vec![Complex64::from_polar(1.0, 0.3)]);
        let pol = project_polarizations(&mode, y22, y2m2, 1.0).unwrap();
        // h+ - i hx = h22 Y22 face-on.
        assert!((pol.plus[0] - 0.63 * 0.3_f64.cos()).abs() < 1e-12);
        assert!((pol.cross[0] + 0.63 * 0.3_f64.sin()).abs() < 1e-12);
    }
}
