//! Formatted terminal output for `seob generate`.
//!
//! Formatting lives here so the numerical code never builds strings.

use crate::domain::{BinaryParameters, GenerationReport, NqcCoefficients, Polarizations};
use crate::domain::units::MPC_SI;

use super::strain_stats;

/// Format the full run summary (inputs, stage diagnostics, output stats).
pub fn format_run_summary(params: &BinaryParameters, report: &GenerationReport, pol: &Polarizations) -> String {
    let mut out = String::new();

    out.push_str("=== seob - spin-aligned EOB waveform ===\n");
    out.push_str(&format!(
        "Masses: m1={:.3} m2={:.3} Msun | M={:.3} eta={:.5}\n",
        params.mass1, params.mass2, report.total_mass, report.eta
    ));
    out.push_str(&format!(
        "Spins: s1z={:.4} s2z={:.4} | a={:.5}\n",
        params.spin1z, params.spin2z, report.spin_param
    ));
    out.push_str(&format!(
        "f_min={:.3} Hz | delta_t={:.6e} s | distance={:.3} Mpc | inclination={:.4} rad\n",
        params.f_min,
        params.delta_t,
        params.distance / MPC_SI,
        params.inclination
    ));

    out.push_str("\nDynamics:\n");
    out.push_str(&format!(
        "- low-res samples: {} | high-res samples: {} (x{})\n",
        report.low_len, report.high_len, report.resample_factor
    ));
    out.push_str(&format!(
        "- hand-off index: {} | hybrid samples: {}\n",
        report.hand_off_index, report.hybrid_len
    ));
    out.push_str(&format!("- orbital frequency peak: t={:.4} M\n", report.time_peak));
    match report.amplitude_peak_time {
        Some(t) => out.push_str(&format!("- amplitude peak: t={t:.4} M\n")),
        None => out.push_str("- amplitude peak: not found\n"),
    }

    out.push_str("\nCorrections:\n");
    out.push_str(&format!("- nqc amplitude: {}\n", fmt_vec(&amplitude_coeffs(&report.nqc))));
    out.push_str(&format!("- nqc phase    : {}\n", fmt_vec(&phase_coeffs(&report.nqc))));
    out.push_str(&format!(
        "- ringdown window: [{:.4}, {:.4}] M (dynamics end {:.4} M)\n",
        report.window.start, report.window.end, report.window.final_time
    ));

    let stats = strain_stats(pol);
    out.push_str("\nOutput:\n");
    out.push_str(&format!(
        "- samples: {} ({:.4} s, {} zero-padded)\n",
        stats.samples, stats.duration, stats.zero_tail
    ));
    out.push_str(&format!(
        "- peak strain: {:.4e} at t={:.6} s\n",
        stats.peak_strain, stats.peak_time
    ));

    if !report.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for w in &report.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

fn amplitude_coeffs(n: &NqcCoefficients) -> [f64; 6] {
    [n.a1, n.a2, n.a3, n.a3s, n.a4, n.a5]
}

fn phase_coeffs(n: &NqcCoefficients) -> [f64; 4] {
    [n.b1, n.b2, n.b3, n.b4]
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}
