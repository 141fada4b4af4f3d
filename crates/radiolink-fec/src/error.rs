/// Errors returned when a codec call violates its buffer contract.
///
/// Bit errors on the channel are never reported here; they are corrected
/// (or not) silently and counted in the decode reports.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FecError {
    /// The input length is not a whole number of codec quanta.
    #[error("input length {len} is not a multiple of {quantum} bytes")]
    InputNotMultiple { len: usize, quantum: usize },

    /// The output buffer does not have the exact size the call produces.
    #[error("output buffer is {actual} bytes, expected {expected}")]
    OutputLength { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, FecError>;
