#[cfg(unix)]
use std::path::Path;

use bytes::Bytes;
use radiolink_fec::{golay, manchester, DecodeReport, LineReport};
use radiolink_frame::{chunks, packetize, Frame};
use radiolink_queue::ByteQueue;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};

/// Turns payload chunks into ring slots: packetize, Golay encode, and
/// optionally Manchester code.
#[derive(Debug)]
pub struct FrameEncoder {
    config: LinkConfig,
    frame: Vec<u8>,
    coded: Vec<u8>,
}

impl FrameEncoder {
    pub fn new(config: &LinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: *config,
            frame: vec![0u8; config.frame_size()],
            coded: vec![0u8; config.encoded_frame_size()],
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Encode one chunk of at most `payload_size` bytes into `slot`.
    ///
    /// `slot` must be exactly [`LinkConfig::slot_size`] bytes.
    pub fn encode_chunk(&mut self, chunk: &[u8], bit_length: usize, slot: &mut [u8]) -> Result<()> {
        packetize(chunk, &mut self.frame, bit_length)?;
        if self.config.line_coding {
            golay::encode(&self.frame, &mut self.coded)?;
            manchester::encode(&self.coded, slot)?;
        } else {
            golay::encode(&self.frame, slot)?;
        }
        Ok(())
    }

    /// Encode a whole stream into back-to-back slots.
    pub fn encode_stream(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let slot_size = self.config.slot_size();
        let parts = chunks(data, self.config.payload_size);
        let mut out = vec![0u8; parts.len() * slot_size];
        for ((chunk, bits), slot) in parts.zip(out.chunks_exact_mut(slot_size)) {
            self.encode_chunk(chunk, bits, slot)?;
        }
        debug!(bytes = data.len(), frames = out.len() / slot_size, "encoded stream");
        Ok(out)
    }
}

/// A frame recovered from one ring slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Meaningful bits in `payload`, as declared by the frame header.
    pub bit_length: usize,
    /// `ceil(bit_length / 8)` bytes with bits past `bit_length` cleared.
    pub payload: Bytes,
    /// Block-code corrections made while decoding this slot.
    pub fec: DecodeReport,
    /// Present when the link is Manchester coded.
    pub line: Option<LineReport>,
}

impl DecodedFrame {
    /// True when neither decoder saw damage it could not undo.
    pub fn is_clean(&self) -> bool {
        self.fec.is_clean() && self.line.is_none_or(|line| line.is_clean())
    }
}

/// Totals over a decoded stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamReport {
    pub frames: usize,
    pub codewords: usize,
    pub corrected_bits: usize,
    pub uncorrectable: usize,
    pub invalid_pairs: usize,
}

impl StreamReport {
    fn record(&mut self, frame: &DecodedFrame) {
        self.frames += 1;
        self.codewords += frame.fec.codewords;
        self.corrected_bits += frame.fec.corrected_bits;
        self.uncorrectable += frame.fec.uncorrectable;
        self.invalid_pairs += frame.line.map_or(0, |line| line.invalid_pairs);
    }
}

/// Turns ring slots back into payloads.
#[derive(Debug)]
pub struct FrameDecoder {
    config: LinkConfig,
    frame: Vec<u8>,
    coded: Vec<u8>,
}

impl FrameDecoder {
    pub fn new(config: &LinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: *config,
            frame: vec![0u8; config.frame_size()],
            coded: vec![0u8; config.encoded_frame_size()],
        })
    }

    /// Decode one slot. Bit errors are repaired where possible and reported,
    /// never returned as errors; a header that is still out of range after
    /// correction is.
    pub fn decode_slot(&mut self, slot: &[u8]) -> Result<DecodedFrame> {
        let line = if self.config.line_coding {
            let line = manchester::decode(slot, &mut self.coded)?;
            if !line.is_clean() {
                warn!(invalid_pairs = line.invalid_pairs, "line noise in slot");
            }
            Some(line)
        } else {
            None
        };

        let coded: &[u8] = if self.config.line_coding {
            &self.coded
        } else {
            slot
        };
        let fec = golay::decode(coded, &mut self.frame)?;
        if !fec.is_clean() {
            warn!(
                uncorrectable = fec.uncorrectable,
                codewords = fec.codewords,
                "frame has uncorrectable codewords"
            );
        }

        let Frame {
            bit_length,
            payload,
        } = Frame::decode(&self.frame)?;
        Ok(DecodedFrame {
            bit_length,
            payload,
            fec,
            line,
        })
    }

    /// Decode back-to-back slots and concatenate their payloads.
    pub fn decode_stream(&mut self, encoded: &[u8]) -> Result<(Vec<u8>, StreamReport)> {
        let slot_size = self.config.slot_size();
        if encoded.len() % slot_size != 0 {
            return Err(LinkError::PartialSlot {
                len: encoded.len(),
                slot_size,
            });
        }

        let mut data = Vec::with_capacity(encoded.len() / slot_size * self.config.payload_size);
        let mut report = StreamReport::default();
        for slot in encoded.chunks_exact(slot_size) {
            let frame = self.decode_slot(slot)?;
            data.extend_from_slice(&frame.payload);
            report.record(&frame);
        }
        debug!(frames = report.frames, bytes = data.len(), "decoded stream");
        Ok((data, report))
    }
}

/// Framer → codec → ring, and back.
#[derive(Debug)]
pub struct Pipeline {
    encoder: FrameEncoder,
    decoder: FrameDecoder,
    queue: ByteQueue,
    slot: Vec<u8>,
}

impl Pipeline {
    /// A pipeline over a process-private ring.
    pub fn new(config: &LinkConfig) -> Result<Self> {
        config.validate()?;
        let queue = ByteQueue::new(config.queue_config()?)?;
        Self::with_queue(config, queue)
    }

    /// A pipeline over a ring mapped from a device or file.
    #[cfg(unix)]
    pub fn map(config: &LinkConfig, path: impl AsRef<Path>, offset: u64) -> Result<Self> {
        config.validate()?;
        let queue = ByteQueue::map(path, offset, config.queue_config()?)?;
        Self::with_queue(config, queue)
    }

    /// A pipeline over an existing queue whose slot size and cursor bias
    /// match `config`.
    pub fn with_queue(config: &LinkConfig, queue: ByteQueue) -> Result<Self> {
        if queue.slot_size() != config.slot_size() {
            return Err(LinkError::SlotMismatch {
                queue: queue.slot_size(),
                expected: config.slot_size(),
            });
        }
        if queue.config().cursor_bias != config.cursor_bias {
            return Err(LinkError::BiasMismatch {
                queue: queue.config().cursor_bias,
                expected: config.cursor_bias,
            });
        }
        Ok(Self {
            encoder: FrameEncoder::new(config)?,
            decoder: FrameDecoder::new(config)?,
            slot: vec![0u8; config.slot_size()],
            queue,
        })
    }

    /// Chunk, frame, encode and push `data`. Returns the number of slots
    /// written; anything beyond the ring's capacity overwrites older slots.
    pub fn send(&mut self, data: &[u8]) -> Result<usize> {
        let mut frames = 0;
        for (chunk, bits) in chunks(data, self.encoder.config.payload_size) {
            self.encoder.encode_chunk(chunk, bits, &mut self.slot)?;
            self.queue.push(&self.slot);
            frames += 1;
        }
        if frames > self.queue.slots() {
            warn!(
                frames,
                slots = self.queue.slots(),
                "stream larger than ring, oldest frames overwritten"
            );
        }
        debug!(
            bytes = data.len(),
            frames,
            cursor = self.queue.internal_cursor(),
            "queued stream"
        );
        Ok(frames)
    }

    /// Pop and decode the slot at the queue cursor.
    pub fn receive(&mut self) -> Result<DecodedFrame> {
        self.queue.pop(&mut self.slot);
        self.decoder.decode_slot(&self.slot)
    }

    /// Pop and decode `count` consecutive slots.
    pub fn receive_all(&mut self, count: usize) -> Result<Vec<DecodedFrame>> {
        (0..count).map(|_| self.receive()).collect()
    }

    pub fn queue(&self) -> &ByteQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut ByteQueue {
        &mut self.queue
    }

    pub fn into_queue(self) -> ByteQueue {
        self.queue
    }

    pub fn config(&self) -> &LinkConfig {
        self.encoder.config()
    }
}
