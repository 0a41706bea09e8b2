//! Error and warning types for waveform generation.
//!
//! Fatal failures are an [`AppError`]; every stage returns `Result<_, AppError>`
//! and all buffers are owned, so an early return releases everything the call
//! allocated. Non-fatal post-processing issues are collected as
//! [`PostProcessingWarning`] values on the generation report instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    /// Invalid physical parameters or an unusable sample rate.
    #[error("invalid input: {0}")]
    Input(String),
    /// Integration or fitting broke down.
    #[error("numerical failure: {0}")]
    Numerical(String),
    /// A buffer could not be allocated.
    #[error("allocation failure: {0}")]
    Resource(String),
    /// File export/import on the CLI surface.
    #[error("i/o error: {0}")]
    Io(String),
}

impl AppError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Input(_) => 2,
            AppError::Numerical(_) => 3,
            AppError::Resource(_) => 4,
            AppError::Io(_) => 5,
        }
    }
}

/// Allocate an empty vector with room for `len` elements, reporting failure
/// as [`AppError::Resource`] instead of aborting.
pub fn try_with_capacity<T>(len: usize, what: &str) -> Result<Vec<T>, AppError> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|e| AppError::Resource(format!("{what} ({len} samples): {e}")))?;
    Ok(out)
}

/// Non-fatal conditions raised after integration. Generation continues with a
/// calibrated fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostProcessingWarning {
    /// The high-resolution orbital frequency never stopped increasing.
    FrequencyPeakNotFound { fallback_time: f64 },
    /// The NQC-corrected amplitude never turned over.
    AmplitudePeakNotFound,
    /// The hand-off lead covered the whole low-resolution pass.
    DegenerateHandOff { low_len: usize, step_back: usize },
    /// The comb would start before the first high-resolution sample.
    CombTooWide { comb_size: f64, available: f64 },
    /// The ringdown fit misses the inspiral waveform at the window end.
    RingdownMismatch { relative_error: f64 },
}

impl std::fmt::Display for PostProcessingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrequencyPeakNotFound { fallback_time } => write!(
                f,
                "orbital frequency peak not found; using t={fallback_time:.6}M"
            ),
            Self::AmplitudePeakNotFound => {
                write!(f, "could not locate mode amplitude peak; using calibrated time shift")
            }
            Self::DegenerateHandOff { low_len, step_back } => write!(
                f,
                "low-resolution pass has {low_len} samples but hand-off steps back {step_back}; re-integrating from t=0"
            ),
            Self::CombTooWide { comb_size, available } => write!(
                f,
                "comb size {comb_size:.3}M exceeds available {available:.3}M before the match point"
            ),
            Self::RingdownMismatch { relative_error } => write!(
                f,
                "ringdown fit differs from inspiral waveform at window end by {relative_error:.3e} (relative)"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_taxonomy() {
        assert_eq!(AppError::input("x").exit_code(), 2);
        assert_eq!(AppError::numerical("x").exit_code(), 3);
        assert_eq!(AppError::Resource("x".into()).exit_code(), 4);
        assert_eq!(AppError::io("x").exit_code(), 5);
    }

    #[test]
    fn display_includes_family() {
        let err = AppError::input("mass1 must be > 0");
        assert_eq!(err.to_string(), "invalid input: mass1 must be > 0");
    }

    #[test]
    fn absurd_allocation_is_a_resource_error() {
        let err = try_with_capacity::<f64>(usize::MAX / 2, "strain buffer").unwrap_err();
        assert!(matches!(err, AppError::Resource(_)));
    }
}
