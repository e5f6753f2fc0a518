//! FIR band-pass design via the windowed-ideal method.
//!
//! For filter order N the kernel has N+1 taps:
//!
//! ```text
//! h[i] = w[i] · ( fh·sinc(fh·(i − N/2)) − fl·sinc(fl·(i − N/2)) )
//! ```
//!
//! where `w` is a Hamming window and `fl`, `fh` are cutoffs pre-normalised
//! as `2·f/fs`. The kernel is deliberately NOT renormalised after
//! windowing; downstream consumers expect this exact gain.
use std::f64::consts::PI;

/// Normalised sinc: `sin(πx)/(πx)`, with `sinc(0) = 1`.
#[inline]
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Design an order-`n` linear-phase band-pass kernel (n+1 taps).
///
/// `fl` and `fh` are the band edges normalised as `2·f/fs` (so 1.0 is the
/// Nyquist rate).
pub fn fir_band_pass(n: usize, fl: f64, fh: f64) -> Vec<f64> {
    let w = hamming(n + 1);
    let mid = n as f64 / 2.0;
    (0..=n)
        .map(|i| {
            let x = i as f64 - mid;
            w[i] * (fh * sinc(fh * x) - fl * sinc(fl * x))
        })
        .collect()
}
