//! Error-corrected, framed data path for a half-duplex radio channel.
//!
//! Application bytes are cut into fixed-size frames, protected with an
//! extended Golay code (optionally Manchester line coded), and pushed into a
//! ring buffer shared with a real-time coprocessor. The receive side runs
//! the same steps in reverse.
//!
//! # Crate Structure
//!
//! - [`fec`]: Golay block code, Manchester line code, bit helpers
//! - [`frame`]: Bit-length framing and stream chunking
//! - [`queue`]: Shared-memory ring buffer and hardware cursor protocol
//! - [`pipeline`]: Framer → codec → queue composition
//! - [`config`]: One configuration shared by all three layers

pub mod config;
pub mod error;
pub mod pipeline;

/// Re-export codec types.
pub mod fec {
    pub use radiolink_fec::*;
}

/// Re-export framing types.
pub mod frame {
    pub use radiolink_frame::*;
}

/// Re-export ring buffer types.
pub mod queue {
    pub use radiolink_queue::*;
}

pub use config::LinkConfig;
pub use error::{LinkError, Result};
pub use pipeline::{DecodedFrame, FrameDecoder, FrameEncoder, Pipeline, StreamReport};
