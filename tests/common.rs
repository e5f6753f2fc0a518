/// Shared helpers: synthetic EDF construction for integration tests.
use std::f64::consts::PI;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One signal to embed in a synthetic EDF.
pub struct TestSignal {
    pub label: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    /// Samples per one-second data record (= nominal rate here).
    pub samples_per_record: usize,
    /// Digital samples, `samples_per_record × n_records` long.
    pub samples: Vec<i16>,
}

impl TestSignal {
    #[allow(unused)]
    pub fn new(
        label: &str,
        physical_dimension: &str,
        samples_per_record: usize,
        samples: Vec<i16>,
    ) -> Self {
        TestSignal {
            label: label.to_string(),
            physical_dimension: physical_dimension.to_string(),
            physical_min: -3276.8,
            physical_max: 3276.7,
            samples_per_record,
            samples,
        }
    }
}

fn ascii_field(value: &str, width: usize) -> Vec<u8> {
    let mut f = value.as_bytes().to_vec();
    assert!(f.len() <= width, "field {value:?} wider than {width}");
    f.resize(width, b' ');
    f
}

#[allow(unused)]
/// Write a minimal EDF with one-second data records.
pub fn write_edf(path: &Path, n_records: usize, signals: &[TestSignal]) {
    for sig in signals {
        assert_eq!(
            sig.samples.len(),
            sig.samples_per_record * n_records,
            "signal {} sample count does not fill {n_records} records",
            sig.label
        );
    }

    let ns = signals.len();
    let mut bytes = Vec::new();
    bytes.extend(ascii_field("0", 8));
    bytes.extend(ascii_field("X X X X", 80));
    bytes.extend(ascii_field("Startdate 01.01.01 X X X", 80));
    bytes.extend(ascii_field("01.01.01", 8));
    bytes.extend(ascii_field("22.00.00", 8));
    bytes.extend(ascii_field(&(256 * (ns + 1)).to_string(), 8));
    bytes.extend(ascii_field("", 44));
    bytes.extend(ascii_field(&n_records.to_string(), 8));
    bytes.extend(ascii_field("1", 8));
    bytes.extend(ascii_field(&ns.to_string(), 4));

    for sig in signals {
        bytes.extend(ascii_field(&sig.label, 16));
    }
    for _ in signals {
        bytes.extend(ascii_field("AgAgCl electrode", 80));
    }
    for sig in signals {
        bytes.extend(ascii_field(&sig.physical_dimension, 8));
    }
    for sig in signals {
        bytes.extend(ascii_field(&format!("{}", sig.physical_min), 8));
    }
    for sig in signals {
        bytes.extend(ascii_field(&format!("{}", sig.physical_max), 8));
    }
    for _ in signals {
        bytes.extend(ascii_field("-32768", 8));
    }
    for _ in signals {
        bytes.extend(ascii_field("32767", 8));
    }
    for _ in signals {
        bytes.extend(ascii_field("HP:0.1Hz LP:75Hz", 80));
    }
    for sig in signals {
        bytes.extend(ascii_field(&sig.samples_per_record.to_string(), 8));
    }
    for _ in signals {
        bytes.extend(ascii_field("", 32));
    }

    for r in 0..n_records {
        for sig in signals {
            let spr = sig.samples_per_record;
            for &d in &sig.samples[r * spr..(r + 1) * spr] {
                bytes.extend(d.to_le_bytes());
            }
        }
    }

    let mut f = File::create(path).unwrap();
    f.write_all(&bytes).unwrap();
}

#[allow(unused)]
/// Digital sine wave: `amplitude · sin(2π·freq·t)` quantised to i16.
pub fn sine_digital(rate: usize, n_records: usize, freq: f64, amplitude: f64) -> Vec<i16> {
    (0..rate * n_records)
        .map(|i| {
            let t = i as f64 / rate as f64;
            (amplitude * (2.0 * PI * freq * t).sin()).round() as i16
        })
        .collect()
}

#[allow(unused)]
/// The standard four-channel montage at `rate` Hz with distinct tones.
pub fn standard_signals(rate: usize, n_records: usize) -> Vec<TestSignal> {
    vec![
        TestSignal::new("C3-A2", "uV", rate, sine_digital(rate, n_records, 10.0, 9000.0)),
        TestSignal::new("C4-A1", "uV", rate, sine_digital(rate, n_records, 11.0, 8000.0)),
        TestSignal::new("EOG(L)", "uV", rate, sine_digital(rate, n_records, 2.0, 6000.0)),
        TestSignal::new("EOG(R)", "uV", rate, sine_digital(rate, n_records, 3.0, 6000.0)),
    ]
}

#[allow(unused)]
/// The label bindings matching [`standard_signals`].
pub fn standard_selection() -> edf2cfs::ChannelSelection {
    edf2cfs::ChannelSelection::new("C3-A2", "C4-A1", "EOG(L)", "EOG(R)")
}
