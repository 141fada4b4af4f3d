/// Errors that can occur while packetizing or depacketizing a frame.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The frame buffer cannot even hold the bit-length header.
    #[error("frame buffer too short ({len} bytes, header needs 2)")]
    FrameTooShort { len: usize },

    /// The requested bit length does not fit in the frame payload.
    #[error("bit length too large ({bits} bits, max {max})")]
    BitLengthTooLarge { bits: usize, max: usize },

    /// The source slice holds fewer bytes than the bit length covers.
    #[error("source data too short ({actual} bytes, need {needed})")]
    DataTooShort { needed: usize, actual: usize },

    /// A received header claims more bits than the frame carries.
    #[error("invalid frame header ({bits} bits, frame holds {max})")]
    InvalidBitLength { bits: usize, max: usize },

    /// The destination buffer cannot hold the recovered payload.
    #[error("destination buffer too small ({actual} bytes, need {needed})")]
    BufferTooSmall { needed: usize, actual: usize },

    /// The configured payload size is outside the representable range.
    #[error("invalid payload size {size} (must be 1..={max})")]
    InvalidPayloadSize { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
