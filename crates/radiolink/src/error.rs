use std::path::PathBuf;

/// Errors that can occur anywhere along the data path.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Codec contract violation.
    #[error("codec error: {0}")]
    Fec(#[from] radiolink_fec::FecError),

    /// Framing error.
    #[error("frame error: {0}")]
    Frame(#[from] radiolink_frame::FrameError),

    /// Ring buffer setup error.
    #[error("queue error: {0}")]
    Queue(#[from] radiolink_queue::QueueError),

    /// The frame size cannot be fed to the block code in whole quanta.
    #[error("frame size {frame_size} is not a multiple of 3 bytes")]
    FrameNotCodecAligned { frame_size: usize },

    /// The queue was built for a different slot size than the codec emits.
    #[error("queue slot size {queue} does not match encoded frame size {expected}")]
    SlotMismatch { queue: usize, expected: usize },

    /// The queue translates the hardware cursor with a different bias.
    #[error("queue cursor bias {queue} does not match configured bias {expected}")]
    BiasMismatch { queue: u32, expected: u32 },

    /// An encoded stream does not hold a whole number of slots.
    #[error("encoded stream of {len} bytes is not a multiple of slot size {slot_size}")]
    PartialSlot { len: usize, slot_size: usize },

    /// Failed to read a configuration file.
    #[error("failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration JSON is malformed.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;
