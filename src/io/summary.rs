//! Read/write run summary JSON.
//!
//! The summary is the portable record of one `seob generate` call: inputs,
//! calibration config and the scalar report (peak time, NQC coefficients,
//! match window, warnings). It does not carry the strain itself; that goes to
//! the CSV export.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BinaryParameters, GenerationConfig, GenerationReport};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub params: BinaryParameters,
    pub config: GenerationConfig,
    pub samples: usize,
    pub report: GenerationReport,
}

impl RunSummary {
    pub fn new(
        params: &BinaryParameters,
        config: &GenerationConfig,
        samples: usize,
        report: &GenerationReport,
    ) -> Self {
        Self {
            tool: "seob".to_string(),
            generated_at: Utc::now(),
            params: *params,
            config: config.clone(),
            samples,
            report: report.clone(),
        }
    }
}

/// Write a run summary JSON file.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::io(format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

/// Read a run summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<RunSummary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid summary JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NqcCoefficients, RingdownMatchWindow};
    use crate::error::PostProcessingWarning;

    #[test]
    fn summary_json_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let params = BinaryParameters {
            mass1: 30.0,
            mass2: 20.0,
            spin1z: 0.3,
            spin2z: -0.1,
            f_min: 20.0,
            delta_t: 1.0 / 4096.0,
            distance: 1.0e24,
            inclination: 0.4,
        };
        let report = GenerationReport {
            total_mass: 50.0,
            eta: 0.24,
            spin_param: 0.1,
            low_len: 1000,
            high_len: 5000,
            hybrid_len: 7000,
            hand_off_index: 979,
            resample_factor: 128,
            time_peak: 120.5,
            amplitude_peak_time: Some(118.0),
            nqc: NqcCoefficients::default(),
            window: RingdownMatchWindow {
                start: 110.5,
                end: 118.0,
                final_time: 125.0,
            },
            warnings: vec![PostProcessingWarning::AmplitudePeakNotFound],
        };
        let summary = RunSummary::new(&params, &GenerationConfig::default(), 1034, &report);

        write_summary_json(&path, &summary).unwrap();
        let back = read_summary_json(&path).unwrap();
        assert_eq!(back.tool, "seob");
        assert_eq!(back.generated_at, summary.generated_at);
        assert_eq!(back.samples, 1034);
        assert_eq!(back.report.hand_off_index, 979);
        assert_eq!(back.report.warnings, report.warnings);
        assert!((back.params.mass1 - 30.0).abs() < 1e-12);
        assert!((back.report.time_peak - 120.5).abs() < 1e-12);
        assert_eq!(back.config.ringdown_overtones, 3);
    }
}
