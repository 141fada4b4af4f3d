use radiolink::{FrameDecoder, LinkConfig, StreamReport};
use serde::Serialize;

use crate::cmd::{read_input, write_output, DecodeArgs};
use crate::exit::{link_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct DecodeOutput {
    output_bytes: usize,
    #[serde(flatten)]
    report: StreamReport,
}

impl Report for DecodeOutput {
    fn title(&self) -> &'static str {
        "decoded"
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("output_bytes", self.output_bytes.to_string()),
            ("frames", self.report.frames.to_string()),
            ("codewords", self.report.codewords.to_string()),
            ("corrected_bits", self.report.corrected_bits.to_string()),
            ("uncorrectable", self.report.uncorrectable.to_string()),
            ("invalid_pairs", self.report.invalid_pairs.to_string()),
        ]
    }
}

pub fn run(args: DecodeArgs, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    let encoded = read_input(&args.input)?;
    let mut decoder = FrameDecoder::new(config).map_err(|err| link_error("decoder", err))?;
    let (data, report) = decoder
        .decode_stream(&encoded)
        .map_err(|err| link_error("decode", err))?;
    write_output(&args.output, &data)?;

    let out = DecodeOutput {
        output_bytes: data.len(),
        report,
    };
    print_report(&out, format);

    if args.strict && (report.uncorrectable > 0 || report.invalid_pairs > 0) {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "{} uncorrectable codewords, {} invalid line pairs",
                report.uncorrectable, report.invalid_pairs
            ),
        ));
    }
    Ok(SUCCESS)
}
