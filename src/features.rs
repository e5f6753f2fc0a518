//! Short-time spectral feature extraction.
//!
//! Each 30 s epoch (3000 samples at 100 Hz) is cut into 32 frames starting
//! at multiples of the 90-sample hop. A frame is 128 samples, Hamming
//! windowed, transformed with a length-128 complex DFT, and reduced to the
//! magnitudes of bins 0..32. The result is one tensor of shape
//! `[epochs, 3, 32, 32]` (channel order EEG, EOG-left, EOG-right), computed
//! in f64 and narrowed to f32 at the end.
use std::sync::Arc;

use ndarray::Array4;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::config::{EPOCH_SAMPLES, N_CHANNELS, N_FREQ, N_TIMES, STFT_HOP, STFT_WINDOW};
use crate::filter::hamming;

/// The per-file feature tensor, `[E, 3, 32, 32]` f32.
///
/// Iteration order of the backing array is epoch-major, then channel, time
/// bin, frequency bin: exactly the CFS payload serialisation order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTensor {
    data: Array4<f32>,
}

impl FeatureTensor {
    pub fn n_epochs(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Serialise every value little-endian in (epoch, channel, time,
    /// frequency) order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for &v in self.data.iter() {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    /// Rebuild a tensor from the little-endian byte image (the inverse of
    /// [`FeatureTensor::to_le_bytes`]).
    pub fn from_le_bytes(bytes: &[u8], n_epochs: usize) -> Option<Self> {
        let expected = n_epochs * N_CHANNELS * N_TIMES * N_FREQ * 4;
        if bytes.len() != expected {
            return None;
        }
        let values: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        let data =
            Array4::from_shape_vec((n_epochs, N_CHANNELS, N_TIMES, N_FREQ), values).ok()?;
        Some(FeatureTensor { data })
    }
}

/// Spectral extractor holding a reusable length-128 DFT plan.
///
/// One instance per worker; the plan itself is immutable once built and the
/// per-call scratch lives on the stack of the caller.
pub struct SpectralExtractor {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
}

impl SpectralExtractor {
    pub fn new() -> Self {
        let mut planner: FftPlanner<f64> = FftPlanner::new();
        let fft = planner.plan_fft_forward(STFT_WINDOW);
        SpectralExtractor {
            fft,
            window: hamming(STFT_WINDOW),
        }
    }

    /// Extract the full feature tensor from the three resampled channels.
    ///
    /// The epoch count derives from the EEG length; trailing samples that do
    /// not fill an epoch are discarded. Frames that extend past the end of a
    /// (shorter) EOG channel read zeros for the missing samples.
    pub fn extract(&self, eeg: &[f64], eogl: &[f64], eogr: &[f64]) -> FeatureTensor {
        let n_epochs = eeg.len() / EPOCH_SAMPLES;
        let mut data = Array4::<f32>::zeros((n_epochs, N_CHANNELS, N_TIMES, N_FREQ));

        let channels: [&[f64]; N_CHANNELS] = [eeg, eogl, eogr];
        let mut buf = vec![Complex::<f64>::default(); STFT_WINDOW];
        let mut magnitudes = [0.0_f64; N_FREQ];

        for e in 0..n_epochs {
            for (c, signal) in channels.iter().enumerate() {
                for t in 0..N_TIMES {
                    let start = e * EPOCH_SAMPLES + t * STFT_HOP;
                    self.frame_magnitudes(signal, start, &mut buf, &mut magnitudes);
                    for (f, &m) in magnitudes.iter().enumerate() {
                        data[[e, c, t, f]] = m as f32;
                    }
                }
            }
        }
        FeatureTensor { data }
    }

    /// Window the 128 samples at `start`, transform, and write the first 32
    /// bin magnitudes into `out`.
    fn frame_magnitudes(
        &self,
        signal: &[f64],
        start: usize,
        buf: &mut [Complex<f64>],
        out: &mut [f64; N_FREQ],
    ) {
        for (i, slot) in buf.iter_mut().enumerate() {
            let sample = signal.get(start + i).copied().unwrap_or(0.0);
            *slot = Complex {
                re: sample * self.window[i],
                im: 0.0,
            };
        }
        self.fft.process(buf);
        for (k, m) in out.iter_mut().enumerate() {
            *m = buf[k].norm();
        }
    }
}

impl Default for SpectralExtractor {
    fn default() -> Self {
        Self::new()
    }
}
