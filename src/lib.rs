//! # edf2cfs — EDF → Compressed Feature Set conversion
//!
//! Converts polysomnography recordings in the European Data Format into
//! CFS, the compact anonymised ingestion format of the sleep-staging
//! service. Raw waveforms are discarded; what survives is a fixed-shape
//! per-epoch spectral tensor, typically an order of magnitude smaller than
//! the source EDF and free of identifying header fields.
//!
//! ## Pipeline overview
//!
//! ```text
//! night1.edf
//!   │
//!   ├─ edf::EdfFile::open()    native EDF reader (header + records)
//!   ├─ channel resolver        C3/C4/EOG-l/EOG-r labels → signals, µV scale
//!   ├─ FIR band-pass           51-tap Hamming windowed-ideal, "same" conv
//!   │     EEG  0.3–45 Hz       (C3 and C4 filtered, then averaged)
//!   │     EOG  0.3–12 Hz
//!   ├─ resample                polyphase rational → 100 Hz
//!   ├─ STFT features           [E, 3, 32, 32] f32, 30 s epochs
//!   ├─ SHA-1 + DEFLATE         digest + zlib stream of the f32 image
//!   └─ container writer        31-byte header + payload → night1.cfs
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use edf2cfs::{convert_file, ChannelSelection, ConvertConfig, JobLog};
//!
//! let cfg = ConvertConfig {
//!     channels: ChannelSelection::new("C3-A2", "C4-A1", "EOG(L)", "EOG(R)"),
//!     overwrite: false,
//! };
//! let mut log = JobLog::new();
//! let summary = convert_file("night1.edf".as_ref(), &cfg, &mut log).unwrap();
//! println!("{} epochs → {}", summary.n_epochs, summary.output.display());
//! ```
//!
//! Batch conversion across worker threads goes through
//! [`pool::convert_all`]; the `edf2cfs` binary is a thin CLI over it.

pub mod channel;
pub mod config;
pub mod container;
pub mod edf;
pub mod error;
pub mod features;
pub mod filter;
pub mod htmllog;
pub mod payload;
pub mod pool;
pub mod report;
pub mod resample;

use std::path::Path;

use tracing::debug;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use channel::{resolve_channels, ChannelRole, ChannelSelection, PhysicalUnit};
pub use config::ConvertConfig;
pub use container::{CfsArtifact, CfsHeader};
pub use edf::EdfFile;
pub use error::ConvertError;
pub use features::{FeatureTensor, SpectralExtractor};
pub use pool::{convert_all, detected_parallelism};
pub use report::{ConvertSummary, JobLog, JobOutcome, RunTotals};

use channel::ResolvedChannel;
use config::{EEG_BAND, EOG_BAND, EPOCH_SAMPLES, FIR_ORDER, TARGET_RATE};
use filter::{conv_same, fir_band_pass};

/// Convert one EDF file into a `.cfs` artifact next to it.
///
/// This is the whole per-file pipeline: destination check, channel
/// resolution, unit scaling, band-pass filtering, resampling to 100 Hz,
/// STFT feature extraction, hashing, compression, and the atomic container
/// write. Progress lines go to `log`; all failures come back as a typed
/// [`ConvertError`] value.
///
/// # Errors
///
/// Any variant of [`ConvertError`]; see the per-stage documentation. On
/// failure no output file exists (a pre-existing `.cfs` is left untouched).
pub fn convert_file(
    path: &Path,
    cfg: &ConvertConfig,
    log: &mut JobLog,
) -> Result<ConvertSummary, ConvertError> {
    let dest = path.with_extension("cfs");
    if !cfg.overwrite && dest.exists() {
        return Err(ConvertError::AlreadyConverted(dest));
    }

    let edf = EdfFile::open(path)?;
    let resolved = resolve_channels(&cfg.channels, &edf.signals)?;

    log.push(format!(
        "Total samples found: {}",
        edf.signals[resolved.c3.signal].samples_in_file
    ));
    for (name, ch) in [
        ("C3:A2", &resolved.c3),
        ("C4:A1", &resolved.c4),
        ("EOGl:A2", &resolved.el),
        ("EOGr:A1", &resolved.er),
    ] {
        log.push(format!(
            "{name} channel, sampling rate: {} Hz measured in {}",
            ch.sample_rate, edf.signals[ch.signal].physical_dimension
        ));
    }

    let read_scaled = |ch: &ResolvedChannel| -> Result<Vec<f64>, ConvertError> {
        let mut samples = edf
            .read_physical(ch.signal)
            .map_err(|_| ConvertError::ReadFailure(ch.role))?;
        for v in &mut samples {
            *v *= ch.scale;
        }
        Ok(samples)
    };

    let c3 = read_scaled(&resolved.c3)?;
    let c4 = read_scaled(&resolved.c4)?;
    let el = read_scaled(&resolved.el)?;
    let er = read_scaled(&resolved.er)?;
    debug!(path = %path.display(), "channels read and scaled to microvolts");

    // Band-pass at each channel's native rate.
    let fs_eeg = resolved.c3.sample_rate;
    let h_eeg = fir_band_pass(FIR_ORDER, 2.0 * EEG_BAND.0 / fs_eeg, 2.0 * EEG_BAND.1 / fs_eeg);
    let fs_el = resolved.el.sample_rate;
    let fs_er = resolved.er.sample_rate;
    let h_eogl = fir_band_pass(FIR_ORDER, 2.0 * EOG_BAND.0 / fs_el, 2.0 * EOG_BAND.1 / fs_el);
    let h_eogr = if fs_er == fs_el {
        h_eogl.clone()
    } else {
        fir_band_pass(FIR_ORDER, 2.0 * EOG_BAND.0 / fs_er, 2.0 * EOG_BAND.1 / fs_er)
    };

    // Filter C3 and C4 separately, then average; the rounding boundary of
    // the output depends on this order.
    let filtered_c3 = conv_same(&c3, &h_eeg);
    let filtered_c4 = conv_same(&c4, &h_eeg);
    let eeg: Vec<f64> = filtered_c3
        .iter()
        .zip(&filtered_c4)
        .map(|(a, b)| (a + b) / 2.0)
        .collect();
    let eogl = conv_same(&el, &h_eogl);
    let eogr = conv_same(&er, &h_eogr);

    let to_target = |x: Vec<f64>, rate: f64| -> Vec<f64> {
        if rate as i64 != TARGET_RATE {
            resample::resample(&x, rate as i64, TARGET_RATE)
        } else {
            x
        }
    };
    let eeg = to_target(eeg, fs_eeg);
    let eogl = to_target(eogl, fs_el);
    let eogr = to_target(eogr, fs_er);
    debug!(samples = eeg.len(), "resampled to {TARGET_RATE} Hz");

    let tensor = SpectralExtractor::new().extract(&eeg, &eogl, &eogr);
    let n_epochs = tensor.n_epochs();
    log.push(format!(
        "{n_epochs} epochs of {} s extracted",
        EPOCH_SAMPLES as i64 / TARGET_RATE
    ));

    let artifact = CfsArtifact::build(&tensor)?;
    artifact.write(&dest)?;
    debug!(dest = %dest.display(), epochs = n_epochs, "artifact written");

    Ok(ConvertSummary {
        output: dest,
        n_epochs,
        compressed_bytes: artifact.compressed.len(),
    })
}
