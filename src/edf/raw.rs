//! Physical-sample extraction from EDF data records.
//!
//! Data records follow the header back to back; within a record each signal
//! contributes `samples_per_record` consecutive 16-bit little-endian
//! two's-complement samples. Physical conversion:
//!
//! ```text
//! physical = physical_min + (digital − digital_min) × bit_value
//! bit_value = (physical_max − physical_min) / (digital_max − digital_min)
//! ```
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::header::{EdfHeader, EdfOpenError, SignalMeta};

/// An opened EDF recording: parsed header plus the geometry needed to seek
/// into its data records.
#[derive(Debug)]
pub struct EdfFile {
    pub path: PathBuf,
    pub signals: Vec<SignalMeta>,
    pub n_records: usize,
    header_bytes: u64,
    record_size: usize,
    /// Byte offset of each signal's slot inside a data record.
    signal_offsets: Vec<usize>,
}

impl EdfFile {
    /// Open `path` and parse its header. No sample data is read yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EdfOpenError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| EdfOpenError::from_io(path, e))?;

        let file_len = file
            .metadata()
            .map_err(|e| EdfOpenError::from_io(path, e))?
            .len();

        let mut reader = BufReader::new(file);
        let header = EdfHeader::parse(&mut reader)?;

        let record_size = header.record_size();
        let promised = header.header_bytes as u64 + (record_size * header.n_records) as u64;
        if file_len < promised {
            return Err(EdfOpenError::Malformed(format!(
                "file holds {file_len} bytes but the header promises {promised}"
            )));
        }

        let mut signal_offsets = Vec::with_capacity(header.signals.len());
        let mut offset = 0usize;
        for sig in &header.signals {
            signal_offsets.push(offset);
            offset += sig.samples_per_record * 2;
        }

        Ok(EdfFile {
            path: path.to_path_buf(),
            signals: header.signals,
            n_records: header.n_records,
            header_bytes: header.header_bytes as u64,
            record_size,
            signal_offsets,
        })
    }

    /// Read the full physical sample sequence of one signal.
    ///
    /// Returns `signals[index].samples_in_file` values in the signal's
    /// physical units (whatever `physical_dimension` says), as `f64`.
    pub fn read_physical(&self, index: usize) -> std::io::Result<Vec<f64>> {
        let sig = &self.signals[index];
        let spr = sig.samples_per_record;
        let bit_value = sig.bit_value();
        let dig_min = sig.digital_min as f64;
        let phys_min = sig.physical_min;

        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);

        let mut out = Vec::with_capacity(sig.samples_in_file);
        let mut record = vec![0u8; spr * 2];

        for r in 0..self.n_records {
            let pos = self.header_bytes
                + (r * self.record_size) as u64
                + self.signal_offsets[index] as u64;
            reader.seek(SeekFrom::Start(pos))?;
            reader.read_exact(&mut record)?;

            for pair in record.chunks_exact(2) {
                let digital = i16::from_le_bytes([pair[0], pair[1]]) as f64;
                out.push(phys_min + (digital - dig_min) * bit_value);
            }
        }
        Ok(out)
    }
}
