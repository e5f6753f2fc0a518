//! Per-job error taxonomy.
//!
//! Every failure a conversion job can hit is a variant here. Jobs return
//! these as values; nothing in the pipeline aborts the process.
use std::path::PathBuf;

use thiserror::Error;

use crate::channel::ChannelRole;
use crate::edf::EdfOpenError;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Destination `.cfs` already exists and overwrite is disabled.
    /// Checked before any EDF work is done.
    #[error("file already converted: {0}")]
    AlreadyConverted(PathBuf),

    #[error(transparent)]
    EdfOpen(#[from] EdfOpenError),

    #[error("{0} label not found")]
    LabelNotFound(ChannelRole),

    #[error("invalid measurement unit {unit:?} on {role} (must be nV, uV, mV or V)")]
    UnsupportedUnit { role: ChannelRole, unit: String },

    #[error("C3 and C4 sampling rates must be same ({c3} Hz vs {c4} Hz)")]
    ChannelRateMismatch { c3: i64, c4: i64 },

    #[error("error reading channel {0} data")]
    ReadFailure(ChannelRole),

    /// SHA-1 digest could not be produced.
    #[error("SHA1 computation failed")]
    IntegrityFailure,

    /// The compressor did not finish within the worst-case output bound.
    #[error("compression buffer was too small")]
    BufferTooSmall,

    #[error("not enough memory for compression")]
    OutOfMemory,

    /// More 30 s epochs than the 16-bit header field can carry.
    #[error("epoch count {0} exceeds the CFS header limit")]
    TooManyEpochs(usize),

    #[error("error writing {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
