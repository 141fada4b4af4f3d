use radiolink::{FrameEncoder, LinkConfig};
use serde::Serialize;
use tracing::info;

use crate::cmd::{read_input, write_output, EncodeArgs};
use crate::exit::{link_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct EncodeOutput {
    input_bytes: usize,
    frames: usize,
    slot_size: usize,
    output_bytes: usize,
    line_coding: bool,
}

impl Report for EncodeOutput {
    fn title(&self) -> &'static str {
        "encoded"
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("input_bytes", self.input_bytes.to_string()),
            ("frames", self.frames.to_string()),
            ("slot_size", self.slot_size.to_string()),
            ("output_bytes", self.output_bytes.to_string()),
            ("line_coding", self.line_coding.to_string()),
        ]
    }
}

pub fn run(args: EncodeArgs, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    let data = read_input(&args.input)?;
    let mut encoder = FrameEncoder::new(config).map_err(|err| link_error("encoder", err))?;
    let encoded = encoder
        .encode_stream(&data)
        .map_err(|err| link_error("encode", err))?;
    write_output(&args.output, &encoded)?;

    let out = EncodeOutput {
        input_bytes: data.len(),
        frames: encoded.len() / config.slot_size(),
        slot_size: config.slot_size(),
        output_bytes: encoded.len(),
        line_coding: config.line_coding,
    };
    info!(frames = out.frames, output = %args.output.display(), "encode complete");
    print_report(&out, format);
    Ok(SUCCESS)
}
