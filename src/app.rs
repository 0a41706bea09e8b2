//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module:
//! - installs the tracing subscriber
//! - parses CLI arguments
//! - runs the generation pipeline
//! - prints the summary/plot and writes optional exports

use std::sync::OnceLock;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::cli::{Command, GenerateArgs, PlotArgs};
use crate::domain::units::MPC_SI;
use crate::domain::{BinaryParameters, GenerationConfig};
use crate::error::AppError;
use crate::io::RunSummary;

pub mod pipeline;

pub use pipeline::{generate_waveform, generate_with_model, validate_config};

static TRACING: OnceLock<()> = OnceLock::new();

/// Entry point for the `seob` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Install the global subscriber once. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) -> Result<(), AppError> {
    if TRACING.set(()).is_err() {
        return Ok(());
    }
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| AppError::input(format!("invalid log filter '{default_filter}': {e}")))?,
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    // Another subscriber may already be installed by an embedding program.
    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let params = params_from_args(&args)?;
    let config = config_from_args(&args);
    let generated = pipeline::generate_waveform(&params, &config)?;
    let pol = &generated.polarizations;

    println!("{}", crate::report::format_run_summary(&params, &generated.report, pol));

    if args.plot && !args.no_plot {
        println!("{}", crate::plot::render_ascii_plot(pol, args.width, args.height));
    }

    if let Some(path) = &args.export {
        crate::io::write_polarizations_csv(path, pol)?;
    }
    if let Some(path) = &args.export_summary {
        let summary = RunSummary::new(&params, &config, pol.len(), &generated.report);
        crate::io::write_summary_json(path, &summary)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let pol = crate::io::read_polarizations_csv(&args.csv)?;
    println!("{}", crate::plot::render_ascii_plot(&pol, args.width, args.height));
    Ok(())
}

/// Physical parameters from CLI flags (distance converted to metres).
pub fn params_from_args(args: &GenerateArgs) -> Result<BinaryParameters, AppError> {
    let delta_t = match args.delta_t {
        Some(dt) => dt,
        None => {
            if !(args.sample_rate.is_finite() && args.sample_rate > 0.0) {
                return Err(AppError::input(format!(
                    "sample rate must be finite and > 0, got {}",
                    args.sample_rate
                )));
            }
            1.0 / args.sample_rate
        }
    };
    Ok(BinaryParameters {
        mass1: args.m1,
        mass2: args.m2,
        spin1z: args.s1z,
        spin2z: args.s2z,
        f_min: args.f_min,
        delta_t,
        distance: args.distance_mpc * MPC_SI,
        inclination: args.inclination,
    })
}

/// Calibration overrides on top of [`GenerationConfig::default`].
pub fn config_from_args(args: &GenerateArgs) -> GenerationConfig {
    GenerationConfig {
        inspiral_stop_radius: args.inspiral_stop_radius,
        ringdown_stop_radius: args.ringdown_stop_radius,
        hand_off_lead: args.hand_off_lead,
        comb_size: args.comb_size,
        ringdown_overtones: args.overtones,
        abs_tol: args.abs_tol,
        rel_tol: args.rel_tol,
        max_time_seconds: args.max_time,
        debug_dir: args.debug_dir.clone(),
        ..GenerationConfig::default()
    }
}

/// Rewrite argv so bare flags mean `seob generate`.
///
/// Rules:
/// - `seob --m1 30 ...`          -> `seob generate --m1 30 ...`
/// - `seob --help/--version/-h`  -> unchanged
/// - `seob <subcommand> ...`     -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // `--log-level` is global and may come first.
    let idx = match argv.get(1).map(String::as_str) {
        Some("--log-level") => 3,
        Some(a) if a.starts_with("--log-level=") => 2,
        _ => 1,
    };
    let Some(arg) = argv.get(idx).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version || matches!(arg.as_str(), "generate" | "plot") {
        return argv;
    }

    if arg.starts_with('-') {
        argv.insert(idx, "generate".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_flags_become_generate() {
        let out = rewrite_args(argv(&["seob", "--m1", "30", "--m2", "20"]));
        assert_eq!(out, argv(&["seob", "generate", "--m1", "30", "--m2", "20"]));
        assert_eq!(rewrite_args(argv(&["seob", "--help"])), argv(&["seob", "--help"]));
        assert_eq!(rewrite_args(argv(&["seob", "plot", "--csv", "a.csv"])), argv(&["seob", "plot", "--csv", "a.csv"]));
        assert_eq!(
            rewrite_args(argv(&["seob", "--log-level", "debug", "--m1", "5"])),
            argv(&["seob", "--log-level", "debug", "generate", "--m1", "5"])
        );
    }

    #[test]
    fn flags_map_onto_params_and_config() {
        let cli = Cli::parse_from(rewrite_args(argv(&[
            "seob",
            "--m1",
            "30",
            "--m2",
            "20",
            "--s1z",
            "-0.4",
            "--sample-rate",
            "8192",
            "--distance-mpc",
            "2",
            "--comb-size",
            "5",
        ])));
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let params = params_from_args(&args).unwrap();
        assert_eq!(params.spin1z, -0.4);
        assert!((params.delta_t - 1.0 / 8192.0).abs() < 1e-18);
        assert!((params.distance - 2.0 * MPC_SI).abs() < 1e6);

        let config = config_from_args(&args);
        assert_eq!(config.comb_size, 5.0);
        assert_eq!(config.ringdown_stop_radius, 1.8);
        assert!(config.debug_dir.is_none());
    }

    #[test]
    fn explicit_delta_t_wins_over_rate() {
        let cli = Cli::parse_from(argv(&["seob", "generate", "--m1", "10", "--m2", "10", "--delta-t", "0.001"]));
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(params_from_args(&args).unwrap().delta_t, 0.001);
    }
}
