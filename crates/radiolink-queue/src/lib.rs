//! Shared-memory ring buffer between software and a real-time consumer.
//!
//! The region layout is a wire contract with the coprocessor firmware:
//!
//! ```text
//! ┌──────────────┬──────────────────┬────────────────────────────┐
//! │ Length (4B)  │ HW cursor (4B)   │ Data (capacity bytes)      │
//! │ software     │ hardware-written │ circular, fixed-size slots │
//! └──────────────┴──────────────────┴────────────────────────────┘
//! ```
//!
//! Each side owns exactly one cursor and only reads the other's, so no
//! locking is involved. There is no backpressure: the software side wraps
//! and overwrites old slots.

pub mod error;
pub mod queue;
pub mod region;

pub use error::{QueueError, Result};
pub use queue::{
    ByteQueue, QueueConfig, CURSOR_OFFSET, DATA_OFFSET, DEFAULT_CURSOR_BIAS, LENGTH_OFFSET,
};
pub use region::SharedRegion;
