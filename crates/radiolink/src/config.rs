use std::path::Path;

use radiolink_fec::INPUT_QUANTUM;
use radiolink_frame::{FrameConfig, DEFAULT_PAYLOAD_SIZE, HEADER_SIZE};
use radiolink_queue::{QueueConfig, QueueError, DEFAULT_CURSOR_BIAS};
use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

/// Default ring depth, enough for 1000 bytes of 43-byte payloads.
pub const DEFAULT_QUEUE_FRAMES: usize = 24;

/// Channel configuration shared by the framer, codec and queue.
///
/// The payload size is the only size that is configured; frame, encoded
/// frame and slot sizes are all derived from it so the three layers cannot
/// disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Payload bytes per frame. `payload_size + 2` must be a multiple of 3.
    pub payload_size: usize,
    /// Slots in the shared ring.
    pub queue_frames: usize,
    /// Bias the firmware adds to its cursor.
    pub cursor_bias: u32,
    /// Manchester-code each encoded frame before it enters the ring.
    pub line_coding: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            payload_size: DEFAULT_PAYLOAD_SIZE,
            queue_frames: DEFAULT_QUEUE_FRAMES,
            cursor_bias: DEFAULT_CURSOR_BIAS,
            line_coding: false,
        }
    }
}

impl LinkConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| LinkError::Config {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    /// Check every derived layout once.
    pub fn validate(&self) -> Result<()> {
        self.frame_config()?;
        if self.frame_size() % INPUT_QUANTUM != 0 {
            return Err(LinkError::FrameNotCodecAligned {
                frame_size: self.frame_size(),
            });
        }
        self.queue_config()?.validate()?;
        Ok(())
    }

    pub fn frame_config(&self) -> Result<FrameConfig> {
        Ok(FrameConfig::new(self.payload_size)?)
    }

    /// Header plus payload.
    pub fn frame_size(&self) -> usize {
        HEADER_SIZE + self.payload_size
    }

    /// Frame size after the block code.
    pub fn encoded_frame_size(&self) -> usize {
        radiolink_fec::golay::encoded_len(self.frame_size())
    }

    /// Bytes one frame occupies in the ring.
    pub fn slot_size(&self) -> usize {
        if self.line_coding {
            self.encoded_frame_size() * 2
        } else {
            self.encoded_frame_size()
        }
    }

    /// Ring layout for this link. Fails when the ring size overflows.
    pub fn queue_config(&self) -> Result<QueueConfig> {
        let slot_size = self.slot_size();
        let capacity =
            slot_size
                .checked_mul(self.queue_frames)
                .ok_or(QueueError::CapacityOverflow {
                    slot_size,
                    slots: self.queue_frames,
                })?;
        Ok(QueueConfig {
            capacity,
            slot_size,
            cursor_bias: self.cursor_bias,
        })
    }
}
