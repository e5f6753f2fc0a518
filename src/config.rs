//! Conversion parameters.
//!
//! [`ConvertConfig`] carries the per-run settings (channel label bindings and
//! the overwrite policy). The fixed shape of the output (100 Hz, 30 s
//! epochs, 32 × 32 spectral bins) is part of the CFS format itself and
//! lives here as constants rather than tunables.

use crate::channel::ChannelSelection;

/// Canonical sample rate every channel is brought to before feature
/// extraction, in Hz.
pub const TARGET_RATE: i64 = 100;

/// Samples per epoch at [`TARGET_RATE`] (30 seconds).
pub const EPOCH_SAMPLES: usize = 3000;

/// FIR band-pass filter order; the designed kernel has `FIR_ORDER + 1` taps.
pub const FIR_ORDER: usize = 50;

/// STFT analysis window length in samples.
pub const STFT_WINDOW: usize = 128;

/// Hop between STFT frame starts within an epoch, in samples.
pub const STFT_HOP: usize = 90;

/// Time bins per epoch.
pub const N_TIMES: usize = 32;

/// Frequency bins kept per frame (DC through bin 31).
pub const N_FREQ: usize = 32;

/// Channels in the feature tensor, in order: EEG, EOG-left, EOG-right.
pub const N_CHANNELS: usize = 3;

/// EEG pass band (Hz), applied at the native C3/C4 rate.
pub const EEG_BAND: (f64, f64) = (0.3, 45.0);

/// EOG pass band (Hz), applied at each EOG channel's native rate.
pub const EOG_BAND: (f64, f64) = (0.3, 12.0);

/// Settings for a conversion run.
///
/// One `ConvertConfig` is shared (immutably) by every job in a run:
///
/// ```
/// use edf2cfs::{ChannelSelection, ConvertConfig};
///
/// let cfg = ConvertConfig {
///     channels: ChannelSelection::new("C3-A2", "C4-A1", "EOG(L)", "EOG(R)"),
///     overwrite: false,
/// };
/// assert!(!cfg.overwrite);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Label bound to each of the four logical channel roles. Matching
    /// against EDF signal labels is case-insensitive.
    pub channels: ChannelSelection,

    /// Replace an existing `.cfs` next to the input. When `false`, a job
    /// whose destination exists fails with `AlreadyConverted` before any
    /// EDF work is done.
    pub overwrite: bool,
}
