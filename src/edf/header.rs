//! EDF header parsing.
//!
//! An EDF file starts with a 256-byte ASCII main header followed by one
//! 256-byte header per signal, stored field-major (all labels, then all
//! transducer fields, then all physical dimensions, …):
//!
//! ```text
//! main header (256 bytes)
//!   8   version            "0" (space padded)
//!  80   patient id
//!  80   recording id
//!   8   start date          dd.mm.yy
//!   8   start time          hh.mm.ss
//!   8   header byte count   = 256 × (ns + 1)
//!  44   reserved
//!   8   data record count
//!   8   record duration     seconds (ASCII float)
//!   4   signal count ns
//!
//! signal headers (ns × 256 bytes, field-major)
//!  16×ns label     80×ns transducer   8×ns phys dim
//!   8×ns phys min   8×ns phys max     8×ns dig min   8×ns dig max
//!  80×ns prefilter  8×ns samples/rec 32×ns reserved
//! ```
//!
//! All numeric fields are ASCII, right-padded with spaces.
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Why an EDF file could not be opened.
///
/// Mirrors the failure kinds of the edflib-style readers this format is
/// usually handled with; `AlreadyOpened` exists for taxonomy parity with
/// handle-table readers and is never produced here.
#[derive(Debug, Error)]
pub enum EdfOpenError {
    #[error("can not open file, no such file or directory: {0}")]
    NotFound(PathBuf),

    #[error("the file is not EDF(+) compliant (it contains format errors): {0}")]
    Malformed(String),

    #[error("too many files opened")]
    TooManyFilesOpen,

    #[error("file has already been opened")]
    AlreadyOpened,

    #[error("a read error occurred: {0}")]
    Read(std::io::Error),
}

impl EdfOpenError {
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        // EMFILE is reported without a stable ErrorKind; match the errno.
        const EMFILE: i32 = 24;
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ if err.raw_os_error() == Some(EMFILE) => Self::TooManyFilesOpen,
            _ => Self::Read(err),
        }
    }
}

/// Metadata for one signal in the EDF.
#[derive(Debug, Clone)]
pub struct SignalMeta {
    /// Signal label, trailing padding stripped (e.g. `"C3-A2"`).
    pub label: String,
    /// Physical dimension string, trailing padding stripped (e.g. `"uV"`).
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    /// Samples this signal contributes to each data record.
    pub samples_per_record: usize,
    /// Total samples across the whole file.
    pub samples_in_file: usize,
    /// Duration of one data record in seconds.
    pub record_duration: f64,
    /// Index of this signal within the EDF.
    pub index: usize,
}

impl SignalMeta {
    /// Nominal sampling rate in Hz: samples-per-record / record-duration.
    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.samples_per_record as f64 / self.record_duration
    }

    /// Physical units per digital step.
    #[inline]
    pub(crate) fn bit_value(&self) -> f64 {
        (self.physical_max - self.physical_min)
            / (self.digital_max as f64 - self.digital_min as f64)
    }
}

/// Parsed EDF header: recording geometry plus per-signal metadata.
#[derive(Debug, Clone)]
pub struct EdfHeader {
    pub signals: Vec<SignalMeta>,
    pub n_records: usize,
    pub record_duration: f64,
    /// Byte offset of the first data record.
    pub header_bytes: usize,
}

impl EdfHeader {
    /// Bytes occupied by one full data record (all signals).
    pub fn record_size(&self) -> usize {
        self.signals.iter().map(|s| s.samples_per_record * 2).sum()
    }

    /// Parse the main + signal header block from the start of `reader`.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, EdfOpenError> {
        let mut main = [0u8; 256];
        reader
            .read_exact(&mut main)
            .map_err(|_| EdfOpenError::Malformed("file shorter than the 256-byte header".into()))?;

        if field_str(&main[0..8]) != "0" {
            return Err(EdfOpenError::Malformed("unsupported version field".into()));
        }

        let header_bytes = field_int(&main[184..192], "header byte count")? as usize;
        let n_records = field_int(&main[236..244], "data record count")?;
        let record_duration = field_f64(&main[244..252], "record duration")?;
        let ns = field_int(&main[252..256], "signal count")?;

        if n_records < 0 {
            return Err(EdfOpenError::Malformed("unknown data record count".into()));
        }
        if !(record_duration > 0.0) {
            return Err(EdfOpenError::Malformed("record duration must be positive".into()));
        }
        if ns < 1 || ns > 640 {
            return Err(EdfOpenError::Malformed(format!("invalid signal count {ns}")));
        }
        let ns = ns as usize;
        if header_bytes != 256 * (ns + 1) {
            return Err(EdfOpenError::Malformed(format!(
                "header byte count {header_bytes} does not match {} signals",
                ns
            )));
        }

        let mut block = vec![0u8; 256 * ns];
        reader
            .read_exact(&mut block)
            .map_err(|_| EdfOpenError::Malformed("truncated signal header block".into()))?;

        // Field-major layout: consecutive byte offsets of each field group.
        let labels = &block[0..16 * ns];
        let physdim = &block[96 * ns..104 * ns];
        let physmin = &block[104 * ns..112 * ns];
        let physmax = &block[112 * ns..120 * ns];
        let digmin = &block[120 * ns..128 * ns];
        let digmax = &block[128 * ns..136 * ns];
        let spr = &block[216 * ns..224 * ns];

        let mut signals = Vec::with_capacity(ns);
        for i in 0..ns {
            let label = field_str(&labels[16 * i..16 * (i + 1)]).to_string();
            let physical_dimension = field_str(&physdim[8 * i..8 * (i + 1)]).to_string();
            let physical_min = field_f64(&physmin[8 * i..8 * (i + 1)], "physical minimum")?;
            let physical_max = field_f64(&physmax[8 * i..8 * (i + 1)], "physical maximum")?;
            let digital_min = field_int(&digmin[8 * i..8 * (i + 1)], "digital minimum")? as i32;
            let digital_max = field_int(&digmax[8 * i..8 * (i + 1)], "digital maximum")? as i32;
            let samples_per_record = field_int(&spr[8 * i..8 * (i + 1)], "samples per record")?;

            if digital_min >= digital_max {
                return Err(EdfOpenError::Malformed(format!(
                    "signal {i}: digital minimum must be below digital maximum"
                )));
            }
            if physical_min == physical_max {
                return Err(EdfOpenError::Malformed(format!(
                    "signal {i}: physical minimum equals physical maximum"
                )));
            }
            if samples_per_record < 1 {
                return Err(EdfOpenError::Malformed(format!(
                    "signal {i}: invalid samples per record"
                )));
            }
            let samples_per_record = samples_per_record as usize;

            signals.push(SignalMeta {
                label,
                physical_dimension,
                physical_min,
                physical_max,
                digital_min,
                digital_max,
                samples_per_record,
                samples_in_file: samples_per_record * n_records as usize,
                record_duration,
                index: i,
            });
        }

        Ok(EdfHeader {
            signals,
            n_records: n_records as usize,
            record_duration,
            header_bytes,
        })
    }
}

// ── ASCII field helpers ───────────────────────────────────────────────────

fn field_str(raw: &[u8]) -> &str {
    std::str::from_utf8(raw).unwrap_or("").trim()
}

fn field_int(raw: &[u8], what: &str) -> Result<i64, EdfOpenError> {
    field_str(raw)
        .parse::<i64>()
        .map_err(|_| EdfOpenError::Malformed(format!("non-numeric {what} field")))
}

fn field_f64(raw: &[u8], what: &str) -> Result<f64, EdfOpenError> {
    let s = field_str(raw);
    let v = s
        .parse::<f64>()
        .map_err(|_| EdfOpenError::Malformed(format!("non-numeric {what} field")))?;
    if !v.is_finite() {
        return Err(EdfOpenError::Malformed(format!("non-finite {what} field")));
    }
    Ok(v)
}
