#[cfg(unix)]
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{QueueError, Result};
use crate::region::SharedRegion;

/// Offset of the software-owned length field.
pub const LENGTH_OFFSET: usize = 0;

/// Offset of the hardware-owned consumer cursor field.
pub const CURSOR_OFFSET: usize = 4;

/// Offset of the circular data region.
pub const DATA_OFFSET: usize = 8;

/// Amount the firmware adds to every cursor value it reports.
pub const DEFAULT_CURSOR_BIAS: u32 = 5;

/// Layout of a shared ring buffer, fixed for the queue's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Size of the circular data region in bytes.
    pub capacity: usize,
    /// Bytes moved by one push or pop.
    pub slot_size: usize,
    /// Bias subtracted from raw hardware cursor values.
    pub cursor_bias: u32,
}

impl QueueConfig {
    /// A queue holding `slots` slots of `slot_size` bytes.
    pub fn with_slots(slot_size: usize, slots: usize) -> Result<Self> {
        let capacity = slot_size
            .checked_mul(slots)
            .ok_or(QueueError::CapacityOverflow { slot_size, slots })?;
        Ok(Self {
            capacity,
            slot_size,
            cursor_bias: DEFAULT_CURSOR_BIAS,
        })
    }

    /// Total region size: header fields plus data.
    pub fn region_size(&self) -> usize {
        DATA_OFFSET + self.capacity
    }

    /// Number of slots in the data region.
    pub fn slots(&self) -> usize {
        self.capacity / self.slot_size.max(1)
    }

    /// Check the layout invariants once, up front.
    pub fn validate(&self) -> Result<()> {
        if self.slot_size == 0 {
            return Err(QueueError::ZeroSlot);
        }
        if self.capacity == 0 || self.capacity % self.slot_size != 0 {
            return Err(QueueError::CapacityNotMultiple {
                capacity: self.capacity,
                slot_size: self.slot_size,
            });
        }
        match self.capacity.checked_add(DATA_OFFSET) {
            Some(size) if size <= u32::MAX as usize => {}
            size => {
                return Err(QueueError::RegionTooLarge {
                    size: size.unwrap_or(usize::MAX),
                })
            }
        }
        Ok(())
    }
}

/// Fixed-capacity ring of equal-size slots in a [`SharedRegion`].
///
/// The software side keeps its own cursor and moves it one slot per push or
/// pop, wrapping at capacity. Pushing never checks the hardware cursor: once
/// the ring is full the oldest slots are overwritten. Callers that need to
/// detect loss compare [`ByteQueue::pru_cursor`] with
/// [`ByteQueue::internal_cursor`] themselves, or use
/// [`ByteQueue::hardware_lag`].
#[derive(Debug)]
pub struct ByteQueue {
    region: SharedRegion,
    config: QueueConfig,
    internal_cursor: u32,
}

impl ByteQueue {
    /// Create a queue over a zeroed, process-private region.
    pub fn new(config: QueueConfig) -> Result<Self> {
        config.validate()?;
        Self::from_region(SharedRegion::anonymous(config.region_size()), config)
    }

    /// Create a queue over a device or file mapping starting at `offset`.
    ///
    /// Existing contents of the region are left as they are.
    #[cfg(unix)]
    pub fn map(path: impl AsRef<Path>, offset: u64, config: QueueConfig) -> Result<Self> {
        config.validate()?;
        let region = SharedRegion::map(path, offset, config.region_size())?;
        Self::from_region(region, config)
    }

    /// Create a queue over an existing region.
    pub fn from_region(region: SharedRegion, config: QueueConfig) -> Result<Self> {
        config.validate()?;
        if region.len() < config.region_size() {
            return Err(QueueError::RegionTooSmall {
                expected: config.region_size(),
                actual: region.len(),
            });
        }
        debug!(
            capacity = config.capacity,
            slot_size = config.slot_size,
            slots = config.slots(),
            mapped = region.is_mapped(),
            "byte queue ready"
        );
        Ok(Self {
            region,
            config,
            internal_cursor: 0,
        })
    }

    /// Copy one slot from `bytes` into the ring and advance.
    ///
    /// The length field grows by one slot, saturating at capacity.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len()` differs from the slot size.
    pub fn push(&mut self, bytes: &[u8]) {
        self.check_slot(bytes.len());
        let at = DATA_OFFSET + self.internal_cursor as usize;
        self.region.copy_in(at, bytes);
        trace!(cursor = self.internal_cursor, "pushed slot");
        self.advance();

        let length = (self.get_length() as usize + self.config.slot_size).min(self.config.capacity);
        self.set_length(length as u32);
    }

    /// Copy the slot at the cursor into `packet` and advance.
    ///
    /// The length field shrinks by one slot, saturating at zero.
    ///
    /// # Panics
    ///
    /// Panics if `packet.len()` differs from the slot size.
    pub fn pop(&mut self, packet: &mut [u8]) {
        self.check_slot(packet.len());
        let at = DATA_OFFSET + self.internal_cursor as usize;
        self.region.copy_out(at, packet);
        trace!(cursor = self.internal_cursor, "popped slot");
        self.advance();

        let length = self.get_length().saturating_sub(self.config.slot_size as u32);
        self.set_length(length);
    }

    /// Borrow the slot at the cursor without advancing.
    pub fn peek(&self) -> &[u8] {
        self.region.bytes(
            DATA_OFFSET + self.internal_cursor as usize,
            self.config.slot_size,
        )
    }

    /// Hardware consumer position as an offset into the data region.
    ///
    /// The firmware reports positions with a fixed bias (5, 97, 189, ... for
    /// 92-byte steps). The bias itself, and anything below it, is the first
    /// slot; other values have the bias removed and wrap at capacity.
    pub fn pru_cursor(&self) -> u32 {
        let raw = self.hardware_cursor_raw();
        let bias = self.config.cursor_bias;
        let offset = if raw <= bias {
            0
        } else {
            (raw - bias) % self.config.capacity as u32
        };
        trace!(raw, offset, "translated hardware cursor");
        offset
    }

    /// Hardware cursor exactly as the firmware wrote it.
    pub fn hardware_cursor_raw(&self) -> u32 {
        self.region.read_u32(CURSOR_OFFSET)
    }

    /// Bytes the software cursor is ahead of the hardware cursor, modulo
    /// capacity. Zero means the consumer has caught up or is a full ring
    /// behind.
    pub fn hardware_lag(&self) -> u32 {
        let capacity = self.config.capacity as u64;
        let ahead = self.internal_cursor as u64 + capacity - self.pru_cursor() as u64;
        (ahead % capacity) as u32
    }

    /// Read the shared length field.
    pub fn get_length(&self) -> u32 {
        self.region.read_u32(LENGTH_OFFSET)
    }

    /// Overwrite the shared length field.
    pub fn set_length(&mut self, n: u32) {
        self.region.write_u32(LENGTH_OFFSET, n);
    }

    /// Software cursor: data-region offset of the next push or pop.
    pub fn internal_cursor(&self) -> u32 {
        self.internal_cursor
    }

    /// Move the software cursor to the slot starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not the start of a slot inside the ring.
    pub fn seek(&mut self, offset: u32) {
        assert!(
            (offset as usize) < self.config.capacity
                && offset as usize % self.config.slot_size == 0,
            "offset {offset} is not a slot boundary"
        );
        self.internal_cursor = offset;
    }

    /// Zero the length field and rewind the software cursor.
    pub fn reset(&mut self) {
        self.internal_cursor = 0;
        self.set_length(0);
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn slot_size(&self) -> usize {
        self.config.slot_size
    }

    pub fn slots(&self) -> usize {
        self.config.slots()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// The whole circular data region.
    pub fn data(&self) -> &[u8] {
        self.region.bytes(DATA_OFFSET, self.config.capacity)
    }

    /// Address of the data region, for firmware that reads slots directly.
    pub fn data_location(&self) -> *const u8 {
        self.region.as_ptr().wrapping_add(DATA_OFFSET)
    }

    /// The underlying region.
    pub fn region(&self) -> &SharedRegion {
        &self.region
    }

    fn advance(&mut self) {
        self.internal_cursor =
            ((self.internal_cursor as usize + self.config.slot_size) % self.config.capacity) as u32;
    }

    fn check_slot(&self, len: usize) {
        assert_eq!(
            len, self.config.slot_size,
            "buffer of {len} bytes does not match slot size {}",
            self.config.slot_size
        );
    }
}
