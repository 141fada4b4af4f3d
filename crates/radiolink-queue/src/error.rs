use std::path::PathBuf;

/// Errors that can occur while setting up a shared ring buffer.
///
/// Once a queue exists, push/pop/peek never fail; misuse is a panic.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The slot size is zero.
    #[error("slot size must be non-zero")]
    ZeroSlot,

    /// The capacity does not hold a whole, non-zero number of slots.
    #[error("capacity {capacity} is not a non-zero multiple of slot size {slot_size}")]
    CapacityNotMultiple { capacity: usize, slot_size: usize },

    /// `slot_size * slots` does not fit in `usize`.
    #[error("{slots} slots of {slot_size} bytes overflow the address space")]
    CapacityOverflow { slot_size: usize, slots: usize },

    /// The region (header + data) does not fit the 32-bit cursor fields.
    #[error("region of {size} bytes exceeds the 32-bit addressable limit")]
    RegionTooLarge { size: usize },

    /// A supplied region is smaller than the layout requires.
    #[error("region too small ({actual} bytes, need {expected})")]
    RegionTooSmall { expected: usize, actual: usize },

    /// The mapping offset would leave the 32-bit fields misaligned.
    #[error("mapping offset {offset:#x} is not 4-byte aligned")]
    Misaligned { offset: u64 },

    /// Failed to open the backing device or file.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to map the backing device or file.
    #[error("failed to map {path}: {source}")]
    Map {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, QueueError>;
