//! Command-line parsing for the `seob` waveform generator.
//!
//! Argument parsing stays here; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "seob", version, about = "Spin-aligned effective-one-body waveform generator")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. `info`, `seob_waveform=debug`).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate h+/hx for one binary, print a summary and optionally plot/export.
    Generate(GenerateArgs),
    /// Plot a previously exported strain CSV.
    Plot(PlotArgs),
}

/// Binary parameters and calibration overrides.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Primary mass (solar masses).
    #[arg(long)]
    pub m1: f64,

    /// Secondary mass (solar masses).
    #[arg(long)]
    pub m2: f64,

    /// Primary dimensionless aligned spin.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub s1z: f64,

    /// Secondary dimensionless aligned spin.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub s2z: f64,

    /// Starting gravitational-wave frequency (Hz).
    #[arg(long, default_value_t = 20.0)]
    pub f_min: f64,

    /// Output sample rate (Hz). Ignored when --delta-t is given.
    #[arg(long, default_value_t = 4096.0)]
    pub sample_rate: f64,

    /// Output sample interval (s).
    #[arg(long)]
    pub delta_t: Option<f64>,

    /// Luminosity distance (Mpc).
    #[arg(long, default_value_t = 100.0)]
    pub distance_mpc: f64,

    /// Inclination (rad).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub inclination: f64,

    /// Render an ASCII plot of h+ (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export (t, h+, hx) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the run summary (inputs, config, report) to JSON.
    #[arg(long = "export-summary")]
    pub export_summary: Option<PathBuf>,

    /// Write the diagnostic bundle into this directory.
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Separation (M) inside which the inspiral pass may stop.
    #[arg(long, default_value_t = 6.0)]
    pub inspiral_stop_radius: f64,

    /// Separation (M) at which the high-resolution pass stops.
    #[arg(long, default_value_t = 1.8)]
    pub ringdown_stop_radius: f64,

    /// Lead time (M) stepped back from the end of the inspiral pass.
    #[arg(long, default_value_t = 50.0)]
    pub hand_off_lead: f64,

    /// Ringdown match window width (M).
    #[arg(long, default_value_t = 7.5)]
    pub comb_size: f64,

    /// Number of quasinormal overtones (1-3).
    #[arg(long, default_value_t = 3)]
    pub overtones: usize,

    /// Integrator absolute tolerance.
    #[arg(long, default_value_t = 1.0e-10)]
    pub abs_tol: f64,

    /// Integrator relative tolerance.
    #[arg(long, default_value_t = 1.0e-9)]
    pub rel_tol: f64,

    /// Maximum integration time per pass (s).
    #[arg(long, default_value_t = 20.0)]
    pub max_time: f64,
}

/// Options for plotting a saved strain CSV.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// CSV produced by `seob generate --export`.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
