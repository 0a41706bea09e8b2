//! Strain series as CSV.
//!
//! One row per output sample: `t` (s, from the epoch), `h_plus`, `h_cross`.
//! The same file feeds `seob plot`.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::domain::Polarizations;
use crate::error::AppError;

const HEADER: [&str; 3] = ["t", "h_plus", "h_cross"];

/// Write the polarizations to a CSV file.
pub fn write_polarizations_csv(path: &Path, pol: &Polarizations) -> Result<(), AppError> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;
    for (i, (hp, hc)) in pol.plus.iter().zip(&pol.cross).enumerate() {
        writer
            .write_record([
                format!("{:.12e}", pol.sample_time(i)),
                format!("{hp:.12e}"),
                format!("{hc:.12e}"),
            ])
            .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Read a CSV written by [`write_polarizations_csv`].
///
/// The sample interval and epoch are recovered from the first two rows.
pub fn read_polarizations_csv(path: &Path) -> Result<Polarizations, AppError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| AppError::io(format!("Failed to open strain CSV '{}': {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read strain CSV headers: {e}")))?
        .clone();
    if headers != StringRecord::from(HEADER.to_vec()) {
        return Err(AppError::input(format!(
            "Unexpected strain CSV header '{}' (expected '{}')",
            headers.iter().collect::<Vec<_>>().join(","),
            HEADER.join(",")
        )));
    }

    let mut times = Vec::new();
    let mut plus = Vec::new();
    let mut cross = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| AppError::input(format!("Invalid strain CSV row: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| -> Result<f64, AppError> {
            let raw = record.get(idx).unwrap_or("");
            raw.parse::<f64>()
                .map_err(|e| AppError::input(format!("Line {line}: invalid {} '{raw}': {e}", HEADER[idx])))
        };
        times.push(field(0)?);
        plus.push(field(1)?);
        cross.push(field(2)?);
    }

    let epoch = times.first().copied().unwrap_or(0.0);
    let delta_t = match times.get(1) {
        Some(t1) => t1 - epoch,
        None => 0.0,
    };

    Ok(Polarizations {
        plus,
        cross,
        delta_t,
        epoch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_keeps_samples_and_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strain.csv");
        let pol = Polarizations {
            plus: vec![1.0e-21, -2.5e-21, 3.0e-22],
            cross: vec![0.0, 4.0e-21, -1.0e-21],
            delta_t: 1.0 / 4096.0,
            epoch: 0.0,
        };
        write_polarizations_csv(&path, &pol).unwrap();
        let back = read_polarizations_csv(&path).unwrap();

        assert_eq!(back.len(), 3);
        assert!((back.delta_t - pol.delta_t).abs() < 1e-15);
        for (a, b) in back.plus.iter().zip(&pol.plus) {
            assert!((a - b).abs() <= 1e-12 * b.abs());
        }
        for (a, b) in back.cross.iter().zip(&pol.cross) {
            assert!((a - b).abs() <= 1e-12 * b.abs());
        }
    }

    #[test]
    fn short_row_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.csv");
        std::fs::write(&path, "t,h_plus,h_cross\n0.0,1.0,2.0\n1.0,3.0\n").unwrap();
        let err = read_polarizations_csv(&path).unwrap_err();
        assert!(matches!(err, AppError::Input(_)), "{err:?}");
    }

    #[test]
    fn padded_fields_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("padded.csv");
        std::fs::write(&path, "t, h_plus, h_cross\n0.0, 1.5, -2.0\n0.5, 0.25, 0.0\n").unwrap();
        let pol = read_polarizations_csv(&path).unwrap();
        assert_eq!(pol.plus, vec![1.5, 0.25]);
        assert_eq!(pol.cross, vec![-2.0, 0.0]);
        assert_eq!(pol.delta_t, 0.5);
    }

    #[test]
    fn wrong_header_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "time,plus\n0,1\n").unwrap();
        let err = read_polarizations_csv(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
