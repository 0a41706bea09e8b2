//! `seob-waveform` library crate.
//!
//! Generates spin-aligned effective-one-body gravitational waveforms: orbital
//! dynamics, the factorized (2,2) mode with NQC and ringdown corrections, and
//! the `h+`/`hx` polarizations. The `seob` binary is a thin wrapper around
//! [`app::generate_waveform`].

pub mod app;
pub mod cli;
pub mod coefficients;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod integrate;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod wave;

pub use app::generate_waveform;
pub use domain::{BinaryParameters, GenerationConfig, GeneratedWaveform, Polarizations};
pub use error::AppError;
