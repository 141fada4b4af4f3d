use bytes::{Buf, BufMut, Bytes};
use tracing::{debug, trace};

use crate::error::{FrameError, Result};

/// Frame header: bit length (2, little-endian).
pub const HEADER_SIZE: usize = 2;

/// Default payload bytes per frame. With the header this makes a 45-byte
/// frame, which the Golay codec turns into 90 bytes.
pub const DEFAULT_PAYLOAD_SIZE: usize = 43;

/// Largest payload whose bit count still fits the 16-bit header.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize / 8;

/// Configuration for the framer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    payload_size: usize,
}

impl FrameConfig {
    /// Create a configuration with an explicit payload size.
    pub fn new(payload_size: usize) -> Result<Self> {
        if payload_size == 0 || payload_size > MAX_PAYLOAD_SIZE {
            return Err(FrameError::InvalidPayloadSize {
                size: payload_size,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self { payload_size })
    }

    /// Payload bytes per frame.
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Total wire size of one frame (header + payload).
    pub fn frame_size(&self) -> usize {
        HEADER_SIZE + self.payload_size
    }

    /// Largest bit length a frame can declare.
    pub fn max_bits(&self) -> usize {
        self.payload_size * 8
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

/// A depacketized payload with its declared bit length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Meaningful bits in `payload`.
    pub bit_length: usize,
    /// `ceil(bit_length / 8)` bytes; bits past `bit_length` are zero.
    pub payload: Bytes,
}

impl Frame {
    /// A frame carrying every bit of `payload`.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            bit_length: payload.len() * 8,
            payload,
        }
    }

    /// Decode an owned frame from wire bytes.
    pub fn decode(frame: &[u8]) -> Result<Self> {
        let mut data = vec![0u8; frame.len().saturating_sub(HEADER_SIZE)];
        let bit_length = depacketize(frame, &mut data)?;
        data.truncate(bit_length.div_ceil(8));
        Ok(Self {
            bit_length,
            payload: Bytes::from(data),
        })
    }

    /// Write this frame into a wire buffer of the configured frame size.
    pub fn encode_into(&self, frame: &mut [u8]) -> Result<()> {
        packetize(&self.payload, frame, self.bit_length)
    }

    /// True when the frame carries fewer bits than `config` allows.
    pub fn is_short(&self, config: &FrameConfig) -> bool {
        self.bit_length < config.max_bits()
    }
}

/// Write `bit_length` bits of `data` into `frame`.
///
/// `frame.len()` is the fixed frame size: a 2-byte header and
/// `frame.len() - 2` payload bytes.
///
/// ```text
/// ┌──────────────┬──────────────────────────┬──────────────┐
/// │ Bit length   │ Payload                  │ Zero padding │
/// │ (2B LE)      │ ceil(bit_length/8) bytes │              │
/// └──────────────┴──────────────────────────┴──────────────┘
/// ```
///
/// Bits of the last payload byte past `bit_length` are cleared so the
/// padding is all zero regardless of what `data` held there.
pub fn packetize(data: &[u8], frame: &mut [u8], bit_length: usize) -> Result<()> {
    if frame.len() < HEADER_SIZE {
        return Err(FrameError::FrameTooShort { len: frame.len() });
    }
    let max = capacity_bits(frame.len());
    if bit_length > max {
        return Err(FrameError::BitLengthTooLarge {
            bits: bit_length,
            max,
        });
    }
    let byte_len = bit_length.div_ceil(8);
    if data.len() < byte_len {
        return Err(FrameError::DataTooShort {
            needed: byte_len,
            actual: data.len(),
        });
    }

    let (mut header, payload) = frame.split_at_mut(HEADER_SIZE);
    header.put_u16_le(bit_length as u16);
    payload[..byte_len].copy_from_slice(&data[..byte_len]);
    mask_tail(&mut payload[..byte_len], bit_length);
    payload[byte_len..].fill(0);
    trace!(bit_length, frame_len = frame.len(), "packetized");
    Ok(())
}

/// Read a frame's payload into `data` and return its bit length.
///
/// Only `ceil(bit_length / 8)` bytes of `data` are written. A header that
/// claims more bits than the frame holds means the frame was corrupted past
/// what the codec could repair and is rejected.
pub fn depacketize(frame: &[u8], data: &mut [u8]) -> Result<usize> {
    if frame.len() < HEADER_SIZE {
        return Err(FrameError::FrameTooShort { len: frame.len() });
    }
    let mut header = &frame[..HEADER_SIZE];
    let bit_length = header.get_u16_le() as usize;
    let max = capacity_bits(frame.len());
    if bit_length > max {
        debug!(bit_length, max, "frame header exceeds frame capacity");
        return Err(FrameError::InvalidBitLength {
            bits: bit_length,
            max,
        });
    }
    let byte_len = bit_length.div_ceil(8);
    if data.len() < byte_len {
        return Err(FrameError::BufferTooSmall {
            needed: byte_len,
            actual: data.len(),
        });
    }

    data[..byte_len].copy_from_slice(&frame[HEADER_SIZE..HEADER_SIZE + byte_len]);
    mask_tail(&mut data[..byte_len], bit_length);
    Ok(bit_length)
}

fn capacity_bits(frame_len: usize) -> usize {
    ((frame_len - HEADER_SIZE) * 8).min(u16::MAX as usize)
}

fn mask_tail(bytes: &mut [u8], bit_length: usize) {
    let used = bit_length % 8;
    if used != 0 {
        if let Some(last) = bytes.last_mut() {
            *last &= 0xFF << (8 - used);
        }
    }
}
