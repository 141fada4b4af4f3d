//! Forward error correction for the radiolink data path.
//!
//! Two independent transforms live here:
//! - [`golay`]: the extended Golay (24,12) block code. Every 3 input bytes
//!   become 6 output bytes, and each 24-bit codeword corrects up to 3 bit
//!   errors on its own.
//! - [`manchester`]: a bit-doubling self-clocking line code.
//!
//! Both are stateless. The Golay lookup tables are built once per process
//! and never mutated afterwards.

pub mod bits;
pub mod error;
pub mod golay;
pub mod manchester;

pub use error::{FecError, Result};
pub use golay::{DecodeReport, ENCODED_QUANTUM, INPUT_QUANTUM};
pub use manchester::LineReport;
