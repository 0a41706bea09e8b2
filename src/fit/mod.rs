//! Post-integration fitting.
//!
//! Responsibilities:
//!
//! - locate the orbital-frequency peak on the high-resolution pass
//! - solve and apply the NQC correction
//! - fit and blend in the quasinormal ringdown

pub mod nqc;
pub mod peak;
pub mod ringdown;

pub use nqc::{apply_nqc, find_amplitude_peak, fit_nqc_coefficients, nqc_factor};
pub use peak::locate_frequency_peak;
pub use ringdown::{attach_ringdown, match_window, AttachedRingdown, RingdownFit};
