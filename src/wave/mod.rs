//! Waveform synthesis from trajectories and final assembly.

pub mod assemble;
pub mod synth;

pub use assemble::{assemble_mode, assembled_len, project_polarizations};
pub use synth::{synthesize, unwrap_phase, SynthesizedMode};
