//! Payload integrity and compression.
//!
//! The float32 byte image produced by the feature extractor is hashed with
//! SHA-1 (the digest goes into the container header) and compressed as a
//! zlib-format DEFLATE stream. The compressor writes into a buffer sized by
//! the zlib worst-case bound so a pathological payload cannot silently
//! truncate.
use flate2::{Compress, Compression, FlushCompress, Status};
use sha1::{Digest, Sha1};

use crate::error::ConvertError;

/// SHA-1 digest length in bytes.
pub const DIGEST_LEN: usize = 20;

/// SHA-1 over `bytes`.
pub fn sha1_digest(bytes: &[u8]) -> Result<[u8; DIGEST_LEN], ConvertError> {
    let digest = Sha1::digest(bytes);
    digest
        .as_slice()
        .try_into()
        .map_err(|_| ConvertError::IntegrityFailure)
}

/// Worst-case size of a zlib stream for `n` input bytes.
///
/// The standard zlib `compressBound` formula: the input plus 5 bytes per
/// 16 KiB stored block, plus the 11-byte stream overhead.
pub fn compress_bound(n: usize) -> usize {
    n + (n >> 12) + (n >> 14) + (n >> 25) + 13
}

/// DEFLATE `bytes` into a fresh buffer (zlib format, default level).
///
/// Fails with `OutOfMemory` when the bounded output buffer cannot be
/// allocated and `BufferTooSmall` when the compressor does not reach stream
/// end within the bound.
pub fn deflate(bytes: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let bound = compress_bound(bytes.len());
    let mut out = Vec::new();
    out.try_reserve_exact(bound)
        .map_err(|_| ConvertError::OutOfMemory)?;

    let mut compressor = Compress::new(Compression::default(), true);
    let status = compressor
        .compress_vec(bytes, &mut out, FlushCompress::Finish)
        .map_err(|_| ConvertError::BufferTooSmall)?;

    match status {
        Status::StreamEnd => Ok(out),
        Status::Ok | Status::BufError => Err(ConvertError::BufferTooSmall),
    }
}
