mod common;

use std::io::Read;

use common::{sine_digital, standard_selection, standard_signals, write_edf, TestSignal};
use edf2cfs::container::HEADER_LEN;
use edf2cfs::{
    convert_file, CfsHeader, ChannelRole, ChannelSelection, ConvertConfig, ConvertError,
    FeatureTensor, JobLog,
};

fn cfg() -> ConvertConfig {
    ConvertConfig {
        channels: standard_selection(),
        overwrite: false,
    }
}

fn decompress(disk: &[u8]) -> Vec<u8> {
    let mut image = Vec::new();
    flate2::read::ZlibDecoder::new(&disk[HEADER_LEN..])
        .read_to_end(&mut image)
        .unwrap();
    image
}

// ── Full-pipeline invariants ──────────────────────────────────────────────

#[test]
fn six_hundred_seconds_at_200hz_yields_twenty_epochs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("night.edf");
    write_edf(&input, 600, &standard_signals(200, 600));

    let mut log = JobLog::new();
    let summary = convert_file(&input, &cfg(), &mut log).unwrap();
    assert_eq!(summary.n_epochs, 20);
    assert_eq!(summary.output, dir.path().join("night.cfs"));

    let disk = std::fs::read(&summary.output).unwrap();
    assert_eq!(
        &disk[..9],
        &[0x43, 0x46, 0x53, 0x01, 0x20, 0x20, 0x03, 0x14, 0x00]
    );

    let header = CfsHeader::parse(&disk).unwrap();
    assert_eq!(header.n_epochs, 20);

    // Payload size law + hash law.
    let image = decompress(&disk);
    assert_eq!(image.len(), 20 * 3 * 32 * 32 * 4);
    assert_eq!(header.sha1, edf2cfs::payload::sha1_digest(&image).unwrap());

    // Reinterpreting the bytes recovers a well-formed tensor.
    let tensor = FeatureTensor::from_le_bytes(&image, 20).unwrap();
    assert_eq!(tensor.as_array().shape(), &[20, 3, 32, 32]);
    assert_eq!(tensor.to_le_bytes(), image);
}

#[test]
fn conversion_is_reproducible_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a").join("same.edf");
    let b = dir.path().join("b").join("same.edf");
    std::fs::create_dir_all(a.parent().unwrap()).unwrap();
    std::fs::create_dir_all(b.parent().unwrap()).unwrap();

    let signals = standard_signals(128, 100);
    write_edf(&a, 100, &signals);
    write_edf(&b, 100, &signals);

    let mut log = JobLog::new();
    let sa = convert_file(&a, &cfg(), &mut log).unwrap();
    let sb = convert_file(&b, &cfg(), &mut log).unwrap();

    assert_eq!(
        std::fs::read(&sa.output).unwrap(),
        std::fs::read(&sb.output).unwrap()
    );
}

#[test]
fn millivolt_relabel_scales_tensor_linearly() {
    let dir = tempfile::tempdir().unwrap();
    let rate = 200;
    let records = 60;

    let uv = dir.path().join("uv.edf");
    write_edf(&uv, records, &standard_signals(rate, records));

    // Same digital data and physical range, relabelled mV everywhere.
    let mv_signals: Vec<TestSignal> = standard_signals(rate, records)
        .into_iter()
        .map(|mut s| {
            s.physical_dimension = "mV".to_string();
            s
        })
        .collect();
    let mv = dir.path().join("mv.edf");
    write_edf(&mv, records, &mv_signals);

    let mut log = JobLog::new();
    let su = convert_file(&uv, &cfg(), &mut log).unwrap();
    let sm = convert_file(&mv, &cfg(), &mut log).unwrap();

    let iu = decompress(&std::fs::read(&su.output).unwrap());
    let im = decompress(&std::fs::read(&sm.output).unwrap());
    let tu = FeatureTensor::from_le_bytes(&iu, su.n_epochs).unwrap();
    let tm = FeatureTensor::from_le_bytes(&im, sm.n_epochs).unwrap();

    for (u, m) in tu.as_array().iter().zip(tm.as_array().iter()) {
        approx::assert_relative_eq!(
            *m as f64,
            1000.0 * *u as f64,
            max_relative = 1e-4,
            epsilon = 1e-6
        );
    }
}

// ── Boundary behaviour ────────────────────────────────────────────────────

#[test]
fn short_recording_yields_valid_empty_cfs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("short.edf");
    // 10 s at 200 Hz → 1000 resampled samples → 0 epochs.
    write_edf(&input, 10, &standard_signals(200, 10));

    let mut log = JobLog::new();
    let summary = convert_file(&input, &cfg(), &mut log).unwrap();
    assert_eq!(summary.n_epochs, 0);

    let disk = std::fs::read(&summary.output).unwrap();
    let header = CfsHeader::parse(&disk).unwrap();
    assert_eq!(header.n_epochs, 0);

    let image = decompress(&disk);
    assert!(image.is_empty());
    assert_eq!(header.sha1, edf2cfs::payload::sha1_digest(&image).unwrap());
}

#[test]
fn native_100hz_bypasses_resampler_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("native.edf");
    // 90 s at 100 Hz → 9000 samples, untouched by the resampler → 3 epochs.
    write_edf(&input, 90, &standard_signals(100, 90));

    let mut log = JobLog::new();
    let summary = convert_file(&input, &cfg(), &mut log).unwrap();
    assert_eq!(summary.n_epochs, 3);

    let disk = std::fs::read(&summary.output).unwrap();
    let header = CfsHeader::parse(&disk).unwrap();
    let image = decompress(&disk);
    assert_eq!(image.len(), 3 * 3 * 32 * 32 * 4);
    assert_eq!(header.sha1, edf2cfs::payload::sha1_digest(&image).unwrap());
}

#[test]
fn labels_match_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("case.edf");
    write_edf(&input, 30, &standard_signals(100, 30));

    let shouty = ConvertConfig {
        channels: ChannelSelection::new("c3-a2", "C4-a1", "eog(l)", "EOG(R)"),
        overwrite: false,
    };
    let mut log = JobLog::new();
    assert!(convert_file(&input, &shouty, &mut log).is_ok());
}

// ── Typed failures ────────────────────────────────────────────────────────

#[test]
fn missing_label_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("nolabel.edf");
    let signals: Vec<TestSignal> = standard_signals(100, 10)
        .into_iter()
        .filter(|s| s.label != "C4-A1")
        .collect();
    write_edf(&input, 10, &signals);

    let mut log = JobLog::new();
    let err = convert_file(&input, &cfg(), &mut log).unwrap_err();
    assert!(matches!(err, ConvertError::LabelNotFound(ChannelRole::C4)));
    assert!(!dir.path().join("nolabel.cfs").exists());
}

#[test]
fn existing_output_is_refused_and_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("night.edf");
    write_edf(&input, 10, &standard_signals(100, 10));

    let dest = dir.path().join("night.cfs");
    std::fs::write(&dest, b"sentinel bytes").unwrap();

    let mut log = JobLog::new();
    let err = convert_file(&input, &cfg(), &mut log).unwrap_err();
    assert!(matches!(err, ConvertError::AlreadyConverted(_)));
    assert_eq!(std::fs::read(&dest).unwrap(), b"sentinel bytes");

    // With overwrite enabled the same input converts fine.
    let overwrite = ConvertConfig {
        channels: standard_selection(),
        overwrite: true,
    };
    convert_file(&input, &overwrite, &mut log).unwrap();
    assert!(CfsHeader::parse(&std::fs::read(&dest).unwrap()).is_some());
}

#[test]
fn c3_c4_rate_disagreement_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mixed.edf");
    let signals = vec![
        TestSignal::new("C3-A2", "uV", 256, sine_digital(256, 10, 10.0, 9000.0)),
        TestSignal::new("C4-A1", "uV", 200, sine_digital(200, 10, 11.0, 8000.0)),
        TestSignal::new("EOG(L)", "uV", 100, sine_digital(100, 10, 2.0, 6000.0)),
        TestSignal::new("EOG(R)", "uV", 100, sine_digital(100, 10, 3.0, 6000.0)),
    ];
    write_edf(&input, 10, &signals);

    let mut log = JobLog::new();
    let err = convert_file(&input, &cfg(), &mut log).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::ChannelRateMismatch { c3: 256, c4: 200 }
    ));
    assert!(!dir.path().join("mixed.cfs").exists());
}
