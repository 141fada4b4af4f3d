use radiolink::fec::golay::CORRECTABLE_BITS;
use radiolink::frame::HEADER_SIZE;
use radiolink::queue::DATA_OFFSET;
use radiolink::LinkConfig;
use serde::Serialize;

use crate::cmd::InfoArgs;
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct InfoOutput {
    payload_size: usize,
    header_size: usize,
    frame_size: usize,
    encoded_frame_size: usize,
    line_coding: bool,
    slot_size: usize,
    queue_frames: usize,
    capacity: usize,
    region_size: usize,
    cursor_bias: u32,
    correctable_bits_per_codeword: u32,
}

impl InfoOutput {
    fn from_config(config: &LinkConfig) -> CliResult<Self> {
        let queue = config
            .queue_config()
            .map_err(|err| link_error("ring layout", err))?;
        Ok(Self {
            payload_size: config.payload_size,
            header_size: HEADER_SIZE,
            frame_size: config.frame_size(),
            encoded_frame_size: config.encoded_frame_size(),
            line_coding: config.line_coding,
            slot_size: config.slot_size(),
            queue_frames: config.queue_frames,
            capacity: queue.capacity,
            region_size: DATA_OFFSET + queue.capacity,
            cursor_bias: config.cursor_bias,
            correctable_bits_per_codeword: CORRECTABLE_BITS,
        })
    }
}

impl Report for InfoOutput {
    fn title(&self) -> &'static str {
        "layout"
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("payload_size", self.payload_size.to_string()),
            ("header_size", self.header_size.to_string()),
            ("frame_size", self.frame_size.to_string()),
            ("encoded_frame_size", self.encoded_frame_size.to_string()),
            ("line_coding", self.line_coding.to_string()),
            ("slot_size", self.slot_size.to_string()),
            ("queue_frames", self.queue_frames.to_string()),
            ("capacity", self.capacity.to_string()),
            ("region_size", self.region_size.to_string()),
            ("cursor_bias", self.cursor_bias.to_string()),
            (
                "correctable_bits_per_codeword",
                self.correctable_bits_per_codeword.to_string(),
            ),
        ]
    }
}

pub fn run(_args: InfoArgs, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    print_report(&InfoOutput::from_config(config)?, format);
    Ok(SUCCESS)
}
