use radiolink::LinkConfig;
use serde::Serialize;

use crate::cmd::PushArgs;
use crate::exit::CliResult;
use crate::output::{OutputFormat, Report};

#[derive(Serialize)]
struct PushOutput {
    region: String,
    frames: usize,
    slots: usize,
    cursor: u32,
    length: u32,
}

impl Report for PushOutput {
    fn title(&self) -> &'static str {
        "pushed"
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("region", self.region.clone()),
            ("frames", self.frames.to_string()),
            ("slots", self.slots.to_string()),
            ("cursor", self.cursor.to_string()),
            ("length", self.length.to_string()),
        ]
    }
}

#[cfg(unix)]
pub fn run(args: PushArgs, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    use radiolink::Pipeline;

    use crate::cmd::read_input;
    use crate::exit::{link_error, SUCCESS};
    use crate::output::print_report;

    let data = read_input(&args.input)?;
    let mut pipeline = Pipeline::map(config, &args.region, args.offset)
        .map_err(|err| link_error("map region", err))?;
    if args.reset {
        pipeline.queue_mut().reset();
    }
    let frames = pipeline
        .send(&data)
        .map_err(|err| link_error("push", err))?;

    let queue = pipeline.queue();
    let out = PushOutput {
        region: args.region.display().to_string(),
        frames,
        slots: queue.slots(),
        cursor: queue.internal_cursor(),
        length: queue.get_length(),
    };
    print_report(&out, format);
    Ok(SUCCESS)
}

#[cfg(not(unix))]
pub fn run(_args: PushArgs, _config: &LinkConfig, _format: OutputFormat) -> CliResult<i32> {
    Err(crate::exit::CliError::new(
        crate::exit::USAGE,
        "mapped regions are only supported on unix",
    ))
}
