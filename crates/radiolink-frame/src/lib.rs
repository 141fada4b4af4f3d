//! Fixed-size framing with an explicit bit-length header.
//!
//! Every frame on the link has the same size so the error-correcting codec
//! always sees the same input length. A frame carries:
//! - A 2-byte little-endian count of meaningful payload bits
//! - `payload_size` payload bytes, zero-padded past the declared bit length
//!
//! The bit length lets the final chunk of a stream be shorter than a full
//! frame without any special case downstream.

pub mod chunk;
pub mod codec;
pub mod error;

pub use chunk::{chunks, frame_count, Chunks};
pub use codec::{
    depacketize, packetize, Frame, FrameConfig, DEFAULT_PAYLOAD_SIZE, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
pub use error::{FrameError, Result};
