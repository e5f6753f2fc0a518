//! EDF file format reader.
//!
//! Implements reading of European Data Format (`.edf`) polysomnography
//! recordings: the fixed ASCII header, the field-major signal header block,
//! and physical-sample extraction from the 16-bit data records.
//!
//! # Quick start
//! ```no_run
//! use edf2cfs::edf::EdfFile;
//!
//! let edf = EdfFile::open("night1.edf").unwrap();
//! for sig in &edf.signals {
//!     println!("{}: {} Hz in {}", sig.label, sig.sample_rate(), sig.physical_dimension);
//! }
//! let c3 = edf.read_physical(0).unwrap(); // Vec<f64> in physical units
//! ```
pub mod header;
pub mod raw;

pub use header::{EdfHeader, EdfOpenError, SignalMeta};
pub use raw::EdfFile;
