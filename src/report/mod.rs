//! Reporting utilities: strain statistics and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::Polarizations;

/// Summary numbers of an output strain series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainStats {
    pub samples: usize,
    pub duration: f64,
    /// Largest `sqrt(h+^2 + hx^2)` and the time it occurs (s from epoch).
    pub peak_strain: f64,
    pub peak_time: f64,
    /// Trailing exactly-zero samples from the padded tail.
    pub zero_tail: usize,
}

/// Compute [`StrainStats`] for a series.
pub fn strain_stats(pol: &Polarizations) -> StrainStats {
    let mut peak_strain = 0.0;
    let mut peak_idx = 0;
    for (i, (hp, hc)) in pol.plus.iter().zip(&pol.cross).enumerate() {
        let h = hp.hypot(*hc);
        if h > peak_strain {
            peak_strain = h;
            peak_idx = i;
        }
    }
    let zero_tail = pol
        .plus
        .iter()
        .zip(&pol.cross)
        .rev()
        .take_while(|(hp, hc)| **hp == 0.0 && **hc == 0.0)
        .count();

    StrainStats {
        samples: pol.len(),
        duration: pol.len() as f64 * pol.delta_t,
        peak_strain,
        peak_time: pol.sample_time(peak_idx),
        zero_tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_find_peak_and_zero_tail() {
        let pol = Polarizations {
            plus: vec![0.1, -0.3, 0.5, 0.2, 0.0, 0.0],
            cross: vec![0.0, 0.4, 0.0, 0.1, 0.0, 0.0],
            delta_t: 0.5,
            epoch: 0.0,
        };
        let s = strain_stats(&pol);
        assert_eq!(s.samples, 6);
        assert!((s.duration - 3.0).abs() < 1e-12);
        assert!((s.peak_strain - 0.5).abs() < 1e-12);
        assert!((s.peak_time - 0.5).abs() < 1e-12);
        assert_eq!(s.zero_tail, 2);
    }
}
