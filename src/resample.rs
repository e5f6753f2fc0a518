//! Polyphase rational resampling to the canonical 100 Hz rate.
//!
//! The ratio is reduced to `up/down` by GCD, the signal is conceptually
//! zero-stuffed by `up`, filtered, and decimated by `down`. The
//! anti-alias / interpolation kernel is a Hamming-windowed sinc low-pass at
//! the lower of the two Nyquist frequencies:
//!
//! ```text
//! half  = 10 · max(up, down)                 (kernel half-order)
//! fc    = 1 / max(up, down)                  (fraction of the intermediate Nyquist)
//! h[j]  = up · fc · sinc(fc·(j − half)) · w[j],   j = 0 .. 2·half
//! ```
//!
//! The `up` factor restores the gain lost to zero-stuffing. Output sample
//! `m` is taken at the kernel centre (`m·down + half` in the intermediate
//! domain), so the resampler is zero-phase; edges read zeros. Only the
//! nonzero polyphase branch is ever evaluated, so the cost per output
//! sample is `(2·half + 1) / up` multiplies.
use crate::filter::{hamming, sinc};

/// Resample `x` from `src_rate` to `dst_rate` (both integer Hz).
///
/// Equal rates pass the input through unchanged. The output length is
/// `round(x.len() · dst_rate / src_rate)`; the result depends only on the
/// inputs and IEEE-754 f64 arithmetic, so it is identical across platforms.
pub fn resample(x: &[f64], src_rate: i64, dst_rate: i64) -> Vec<f64> {
    if src_rate == dst_rate {
        return x.to_vec();
    }
    if x.is_empty() {
        return Vec::new();
    }

    let g = gcd(src_rate as u64, dst_rate as u64);
    let up = (dst_rate as u64 / g) as usize;
    let down = (src_rate as u64 / g) as usize;

    let h = anti_alias_kernel(up, down);
    let half = (h.len() - 1) / 2;

    let n = x.len();
    let n_out = (n as f64 * dst_rate as f64 / src_rate as f64).round() as usize;

    let mut y = Vec::with_capacity(n_out);
    for m in 0..n_out {
        let centre = m * down + half;
        // Input indices i whose zero-stuffed position i·up falls under the
        // kernel support [centre − 2·half, centre].
        let i_lo = centre.saturating_sub(2 * half).div_ceil(up);
        let i_hi = (centre / up).min(n - 1);
        let mut acc = 0.0_f64;
        for i in i_lo..=i_hi {
            acc += h[centre - i * up] * x[i];
        }
        y.push(acc);
    }
    y
}

/// Windowed-sinc low-pass for an `up/down` rational stage.
pub fn anti_alias_kernel(up: usize, down: usize) -> Vec<f64> {
    let half = 10 * up.max(down);
    let fc = 1.0 / up.max(down) as f64;
    let w = hamming(2 * half + 1);
    (0..=2 * half)
        .map(|j| {
            let t = j as f64 - half as f64;
            up as f64 * fc * sinc(fc * t) * w[j]
        })
        .collect()
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
