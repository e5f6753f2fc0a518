//! FIR band-pass filtering.
//!
//! [`design`] builds the fixed-order Hamming-windowed band-pass kernels;
//! [`apply`] runs the centre-aligned "same" convolution.
pub mod apply;
pub mod design;

pub use apply::conv_same;
pub use design::{fir_band_pass, hamming, sinc};
