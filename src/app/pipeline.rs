//! The generation pipeline shared by the CLI and library callers.
//!
//! coefficients -> QNMs / Nyquist check -> initial conditions -> two-pass
//! dynamics -> high-res mode -> frequency peak -> NQC -> ringdown ->
//! low-res mode -> assembly -> polarizations
//!
//! Every stage consumes the complete output of the previous one. Nothing is
//! shared between calls.

use std::f64::consts::PI;

use num_complex::Complex64;
use tracing::{info, warn};

use crate::coefficients::derive_coefficients;
use crate::debug::{write_debug_bundle, DebugArtifacts};
use crate::domain::{BinaryParameters, GenerationConfig, GenerationReport, GeneratedWaveform};
use crate::error::{AppError, PostProcessingWarning};
use crate::fit::{apply_nqc, attach_ringdown, find_amplitude_peak, fit_nqc_coefficients, locate_frequency_peak, match_window};
use crate::integrate::run_stages;
use crate::models::{EobModel, ReducedSeobModel};
use crate::wave::{assemble_mode, project_polarizations, synthesize};

/// Generate `h+`/`hx` for one binary with the built-in model.
pub fn generate_waveform(params: &BinaryParameters, config: &GenerationConfig) -> Result<GeneratedWaveform, AppError> {
    generate_with_model(&ReducedSeobModel, params, config)
}

/// Reject configurations the pipeline cannot run with.
pub fn validate_config(config: &GenerationConfig) -> Result<(), AppError> {
    let positive = [
        ("inspiral_stop_radius", config.inspiral_stop_radius),
        ("ringdown_stop_radius", config.ringdown_stop_radius),
        ("hand_off_lead", config.hand_off_lead),
        ("resample_target", config.resample_target),
        ("abs_tol", config.abs_tol),
        ("rel_tol", config.rel_tol),
        ("max_time_seconds", config.max_time_seconds),
        ("peak_tolerance", config.peak_tolerance),
        ("ringdown_efolds", config.ringdown_efolds),
        ("continuity_tolerance", config.continuity_tolerance),
    ];
    for (name, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(AppError::input(format!("{name} must be finite and > 0, got {value}")));
        }
    }
    if !(config.comb_size.is_finite() && config.comb_size >= 0.0) {
        return Err(AppError::input(format!("comb_size must be >= 0, got {}", config.comb_size)));
    }
    if config.ringdown_stop_radius >= config.inspiral_stop_radius {
        return Err(AppError::input("ringdown_stop_radius must be below inspiral_stop_radius"));
    }
    if config.max_steps == 0 {
        return Err(AppError::input("max_steps must be > 0"));
    }
    Ok(())
}

/// Generate with a caller-supplied physics model.
pub fn generate_with_model<M: EobModel>(
    model: &M,
    params: &BinaryParameters,
    config: &GenerationConfig,
) -> Result<GeneratedWaveform, AppError> {
    validate_config(config)?;
    let coeffs = derive_coefficients(params)?;
    let m_s = coeffs.total_mass_seconds;

    let qnms_si = model.qnm_frequencies(&coeffs, config.ringdown_overtones)?;
    let fundamental = qnms_si
        .first()
        .ok_or_else(|| AppError::numerical("no quasinormal modes"))?;
    let nyquist_limit = PI / fundamental.re;
    if params.delta_t > nyquist_limit {
        return Err(AppError::input(format!(
            "sample interval {:.6e}s too coarse to resolve the ringdown (need <= {nyquist_limit:.6e}s)",
            params.delta_t
        )));
    }
    let qnms: Vec<Complex64> = qnms_si.iter().map(|w| w * m_s).collect();

    let initial = model.initial_conditions(params, &coeffs)?;
    let staged = run_stages(model, params, &coeffs, config, initial)?;
    let mut warnings = staged.warnings.clone();

    // High-resolution mode and its peak.
    let high = &staged.high;
    let high_synth = synthesize(model, &coeffs, high, high.len())?;
    let final_time = high
        .last_time()
        .ok_or_else(|| AppError::numerical("high-resolution pass produced no samples"))?;
    let time_peak = match locate_frequency_peak(high.times(), &high_synth.omega, config.peak_tolerance)? {
        Some(t) => t,
        None => {
            let w = PostProcessingWarning::FrequencyPeakNotFound {
                fallback_time: final_time,
            };
            warn!("{w}");
            warnings.push(w);
            final_time
        }
    };

    // NQC at the calibrated amplitude-peak time.
    let delta_t_peak = model.peak_delta_t(&coeffs);
    let match_time = (time_peak - delta_t_peak).clamp(0.0, final_time);
    let nqc = fit_nqc_coefficients(
        high,
        &high_synth,
        &model.peak_targets(&coeffs),
        model.calibrated_nqc(&coeffs),
        match_time,
    )?;
    let high_nqc = apply_nqc(&high_synth.mode, high, &high_synth.omega, &nqc)?;
    let amplitude_peak_time = find_amplitude_peak(high.times(), &high_nqc);
    if amplitude_peak_time.is_none() {
        let w = PostProcessingWarning::AmplitudePeakNotFound;
        warn!("{w}");
        warnings.push(w);
    }

    // Ringdown.
    let (window, comb_warning) = match_window(time_peak, delta_t_peak, config.comb_size, final_time);
    if let Some(w) = comb_warning {
        warn!("{w}");
        warnings.push(w);
    }
    let attached = attach_ringdown(
        &high_nqc,
        high.step(),
        &window,
        &qnms,
        config.ringdown_efolds,
        config.continuity_tolerance,
    )?;
    warnings.extend(attached.warnings.iter().cloned());

    // Low-resolution mode up to the hand-off, corrected with the same NQC.
    let low = &staged.low;
    let low_synth = synthesize(model, &coeffs, low, staged.hand_off_index)?;
    let low_nqc = apply_nqc(&low_synth.mode, low, &low_synth.omega, &nqc)?;

    let assembled = assemble_mode(
        &low_nqc,
        low.len(),
        &attached.mode,
        staged.hand_off_index,
        staged.plan.resample_factor,
    )?;

    let y22 = model.spin_weighted_harmonic(2, 2, params.inclination, 0.0)?;
    let y2m2 = model.spin_weighted_harmonic(2, -2, params.inclination, 0.0)?;
    let polarizations = project_polarizations(&assembled, y22, y2m2, params.delta_t)?;

    let report = GenerationReport {
        total_mass: coeffs.total_mass,
        eta: coeffs.eta,
        spin_param: coeffs.spin_param,
        low_len: low.len(),
        high_len: high.len(),
        hybrid_len: attached.mode.len(),
        hand_off_index: staged.hand_off_index,
        resample_factor: staged.plan.resample_factor,
        time_peak,
        amplitude_peak_time,
        nqc,
        window,
        warnings,
    };

    if let Some(dir) = &config.debug_dir {
        let path = write_debug_bundle(
            dir,
            &DebugArtifacts {
                params,
                report: &report,
                staged: &staged,
                high_raw: &high_synth.mode,
                high_nqc: &high_nqc,
                hybrid: &attached.mode,
            },
        )?;
        info!(path = %path.display(), "wrote debug bundle");
    }

    info!(
        samples = polarizations.len(),
        time_peak,
        warnings = report.warnings.len(),
        "waveform generated"
    );
    Ok(GeneratedWaveform { polarizations, report })
}
