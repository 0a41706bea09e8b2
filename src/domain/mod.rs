//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run inputs (`BinaryParameters`, `GenerationConfig`)
//! - the dynamics and waveform products passed between stages
//! - outputs (`Polarizations`, `GenerationReport`)
//! - physical unit conversions (`units`)

pub mod types;
pub mod units;

pub use types::*;
