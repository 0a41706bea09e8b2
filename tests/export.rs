use seob_waveform::domain::units::MPC_SI;
use seob_waveform::io::{read_polarizations_csv, read_summary_json, write_polarizations_csv, write_summary_json, RunSummary};
use seob_waveform::plot::render_ascii_plot;
use seob_waveform::report::format_run_summary;
use seob_waveform::{generate_waveform, BinaryParameters, GenerationConfig};

#[test]
fn generated_strain_survives_csv_and_summary_export() {
    let params = BinaryParameters {
        mass1: 25.0,
        mass2: 15.0,
        spin1z: 0.2,
        spin2z: 0.0,
        f_min: 25.0,
        delta_t: 1.0 / 4096.0,
        distance: 400.0 * MPC_SI,
        inclination: 0.7,
    };
    let config = GenerationConfig::default();
    let out = generate_waveform(&params, &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("strain.csv");
    let json = dir.path().join("run.json");

    write_polarizations_csv(&csv, &out.polarizations).unwrap();
    let back = read_polarizations_csv(&csv).unwrap();
    assert_eq!(back.len(), out.polarizations.len());
    assert!((back.delta_t - params.delta_t).abs() < 1e-12);
    let scale = out
        .polarizations
        .plus
        .iter()
        .fold(0.0_f64, |m, h| m.max(h.abs()));
    for (a, b) in back.plus.iter().zip(&out.polarizations.plus) {
        assert!((a - b).abs() <= 1e-10 * scale);
    }

    let summary = RunSummary::new(&params, &config, out.polarizations.len(), &out.report);
    write_summary_json(&json, &summary).unwrap();
    let read = read_summary_json(&json).unwrap();
    assert_eq!(read.samples, out.polarizations.len());
    assert_eq!(read.report.hand_off_index, out.report.hand_off_index);
    assert_eq!(read.report.warnings.len(), out.report.warnings.len());

    let plot = render_ascii_plot(&back, 60, 15);
    assert_eq!(plot.lines().count(), 16);
    assert!(plot.contains('-'));

    let text = format_run_summary(&params, &out.report, &out.polarizations);
    assert!(text.contains("m1=25.000 m2=15.000"));
}
