//! The CFS container: fixed 31-byte header plus compressed payload.
//!
//! On-disk layout (all multi-byte integers little-endian):
//!
//! ```text
//! offset size field
//!      0    3 signature      "CFS"
//!      3    1 version        1
//!      4    1 n_freq         32
//!      5    1 n_times        32
//!      6    1 n_channels     3
//!      7    2 n_epochs       u16 LE
//!      9    1 compression    1
//!     10    1 hash           1
//!     11   20 sha1           digest of the uncompressed f32 payload
//!     31    * payload        zlib DEFLATE stream
//! ```
//!
//! Everything is emitted through explicit little-endian byte conversion, so
//! the disk image is identical on big-endian hosts.
use std::io::Write;
use std::path::Path;

use crate::config::{N_CHANNELS, N_FREQ, N_TIMES};
use crate::error::ConvertError;
use crate::features::FeatureTensor;
use crate::payload::{deflate, sha1_digest, DIGEST_LEN};

pub const SIGNATURE: &[u8; 3] = b"CFS";
pub const VERSION: u8 = 1;
pub const HEADER_LEN: usize = 31;

/// The fixed CFS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfsHeader {
    pub n_epochs: u16,
    pub sha1: [u8; DIGEST_LEN],
}

impl CfsHeader {
    pub fn new(n_epochs: usize, sha1: [u8; DIGEST_LEN]) -> Result<Self, ConvertError> {
        let n_epochs =
            u16::try_from(n_epochs).map_err(|_| ConvertError::TooManyEpochs(n_epochs))?;
        Ok(CfsHeader { n_epochs, sha1 })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..3].copy_from_slice(SIGNATURE);
        out[3] = VERSION;
        out[4] = N_FREQ as u8;
        out[5] = N_TIMES as u8;
        out[6] = N_CHANNELS as u8;
        out[7..9].copy_from_slice(&self.n_epochs.to_le_bytes());
        out[9] = 1; // compression
        out[10] = 1; // hash
        out[11..31].copy_from_slice(&self.sha1);
        out
    }

    /// Parse a header back from disk bytes. `None` for anything that is not
    /// a version-1 CFS header.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_LEN
            || &bytes[0..3] != SIGNATURE
            || bytes[3] != VERSION
            || bytes[4] != N_FREQ as u8
            || bytes[5] != N_TIMES as u8
            || bytes[6] != N_CHANNELS as u8
            || bytes[9] != 1
            || bytes[10] != 1
        {
            return None;
        }
        let n_epochs = u16::from_le_bytes([bytes[7], bytes[8]]);
        let mut sha1 = [0u8; DIGEST_LEN];
        sha1.copy_from_slice(&bytes[11..31]);
        Some(CfsHeader { n_epochs, sha1 })
    }
}

/// A fully assembled artifact, ready to hit the filesystem.
#[derive(Debug, Clone)]
pub struct CfsArtifact {
    pub header: CfsHeader,
    pub compressed: Vec<u8>,
}

impl CfsArtifact {
    /// Serialise, hash, and compress a feature tensor.
    pub fn build(tensor: &FeatureTensor) -> Result<Self, ConvertError> {
        let image = tensor.to_le_bytes();
        let sha1 = sha1_digest(&image)?;
        let compressed = deflate(&image)?;
        let header = CfsHeader::new(tensor.n_epochs(), sha1)?;
        Ok(CfsArtifact { header, compressed })
    }

    /// Write the artifact to `dest`, atomically.
    ///
    /// The bytes go to a temporary sibling first and are renamed into place,
    /// so a failure part-way leaves no `.cfs` behind (and never a truncated
    /// one).
    pub fn write(&self, dest: &Path) -> Result<(), ConvertError> {
        let fail = |source: std::io::Error| ConvertError::WriteFailure {
            path: dest.to_path_buf(),
            source,
        };

        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
        tmp.write_all(&self.header.to_bytes()).map_err(fail)?;
        tmp.write_all(&self.compressed).map_err(fail)?;
        tmp.flush().map_err(fail)?;
        tmp.persist(dest).map_err(|e| fail(e.error))?;
        Ok(())
    }
}
