//! Debug bundle writer for inspecting the dynamics and the waveform before and
//! after each correction stage.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::{BinaryParameters, GenerationReport, ModeWaveform, Trajectory};
use crate::error::AppError;
use crate::integrate::StagedDynamics;

/// Borrowed views of everything the bundle records.
pub struct DebugArtifacts<'a> {
    pub params: &'a BinaryParameters,
    pub report: &'a GenerationReport,
    pub staged: &'a StagedDynamics,
    /// High-resolution mode before the NQC correction.
    pub high_raw: &'a ModeWaveform,
    pub high_nqc: &'a ModeWaveform,
    pub hybrid: &'a ModeWaveform,
}

fn io_err(e: std::io::Error) -> AppError {
    AppError::io(format!("failed to write debug bundle: {e}"))
}

pub fn write_debug_bundle(dir: &Path, artifacts: &DebugArtifacts<'_>) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::io(format!("failed to create debug dir: {e}")))?;

    let p = artifacts.params;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!(
        "seob_debug_m{:.2}_{:.2}_s{:.2}_{:.2}_{}.md",
        p.mass1, p.mass2, p.spin1z, p.spin2z, ts
    ));
    let file = File::create(&path).map_err(|e| AppError::io(format!("failed to create debug file: {e}")))?;
    let mut out = BufWriter::new(file);

    write_header(&mut out, artifacts).map_err(io_err)?;

    let staged = artifacts.staged;
    write_dynamics(&mut out, "Low-resolution dynamics", &staged.low).map_err(io_err)?;
    write_dynamics(&mut out, "High-resolution dynamics", &staged.high).map_err(io_err)?;

    writeln!(out, "\n## High-resolution (2,2) mode").map_err(io_err)?;
    writeln!(out, "| t | re_raw | im_raw | re_nqc | im_nqc |").map_err(io_err)?;
    writeln!(out, "| - | - | - | - | - |").map_err(io_err)?;
    for ((t, raw), nqc) in staged
        .high
        .times()
        .iter()
        .zip(&artifacts.high_raw.samples)
        .zip(&artifacts.high_nqc.samples)
    {
        writeln!(out, "| {t:.6} | {:.9e} | {:.9e} | {:.9e} | {:.9e} |", raw.re, raw.im, nqc.re, nqc.im)
            .map_err(io_err)?;
    }

    writeln!(out, "\n## Hybrid mode").map_err(io_err)?;
    writeln!(out, "| t | re | im |").map_err(io_err)?;
    writeln!(out, "| - | - | - |").map_err(io_err)?;
    let step = staged.high.step();
    for (i, h) in artifacts.hybrid.samples.iter().enumerate() {
        writeln!(out, "| {:.6} | {:.9e} | {:.9e} |", i as f64 * step, h.re, h.im).map_err(io_err)?;
    }

    out.flush().map_err(io_err)?;
    Ok(path)
}

fn write_header<W: Write>(out: &mut W, a: &DebugArtifacts<'_>) -> std::io::Result<()> {
    let p = a.params;
    let r = a.report;
    writeln!(out, "# seob debug bundle")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- masses: {:.4}, {:.4} Msun", p.mass1, p.mass2)?;
    writeln!(out, "- spins: {:.4}, {:.4}", p.spin1z, p.spin2z)?;
    writeln!(out, "- f_min: {:.3} Hz, delta_t: {:.6e} s", p.f_min, p.delta_t)?;
    writeln!(out, "- eta: {:.6}, spin parameter: {:.6}", r.eta, r.spin_param)?;
    writeln!(
        out,
        "- passes: low={} high={} hybrid={} hand_off={} resample={}",
        r.low_len, r.high_len, r.hybrid_len, r.hand_off_index, r.resample_factor
    )?;
    writeln!(out, "- time_peak: {:.6} M", r.time_peak)?;
    match r.amplitude_peak_time {
        Some(t) => writeln!(out, "- amplitude_peak: {t:.6} M")?,
        None => writeln!(out, "- amplitude_peak: -")?,
    }
    writeln!(
        out,
        "- window: [{:.6}, {:.6}] final {:.6} M",
        r.window.start, r.window.end, r.window.final_time
    )?;
    let n = &r.nqc;
    writeln!(
        out,
        "- nqc: a1={:.6e} a2={:.6e} a3={:.6e} a3s={:.6e} a4={:.6e} a5={:.6e} b1={:.6e} b2={:.6e} b3={:.6e} b4={:.6e}",
        n.a1, n.a2, n.a3, n.a3s, n.a4, n.a5, n.b1, n.b2, n.b3, n.b4
    )?;
    for w in &r.warnings {
        writeln!(out, "- warning: {w}")?;
    }
    Ok(())
}

fn write_dynamics<W: Write>(out: &mut W, title: &str, traj: &Trajectory) -> std::io::Result<()> {
    writeln!(out, "\n## {title}")?;
    writeln!(out, "| t | r | phi | pr | pphi |")?;
    writeln!(out, "| - | - | - | - | - |")?;
    for (t, s) in traj.times().iter().zip(traj.states()) {
        writeln!(out, "| {t:.6} | {:.12} | {:.12} | {:.12e} | {:.12} |", s.r, s.phi, s.pr, s.pphi)?;
    }
    Ok(())
}
