use radiolink::LinkConfig;
use serde::Serialize;

use crate::cmd::StatusArgs;
use crate::exit::CliResult;
use crate::output::{OutputFormat, Report};

#[derive(Serialize)]
struct StatusOutput {
    region: String,
    capacity: usize,
    slot_size: usize,
    length: u32,
    pending_frames: u32,
    hardware_cursor_raw: u32,
    hardware_cursor: u32,
    hardware_slot: u32,
    software_cursor: u32,
    lag_bytes: u32,
}

impl Report for StatusOutput {
    fn title(&self) -> &'static str {
        "status"
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("region", self.region.clone()),
            ("capacity", self.capacity.to_string()),
            ("slot_size", self.slot_size.to_string()),
            ("length", self.length.to_string()),
            ("pending_frames", self.pending_frames.to_string()),
            ("hardware_cursor_raw", self.hardware_cursor_raw.to_string()),
            ("hardware_cursor", self.hardware_cursor.to_string()),
            ("hardware_slot", self.hardware_slot.to_string()),
            ("software_cursor", self.software_cursor.to_string()),
            ("lag_bytes", self.lag_bytes.to_string()),
        ]
    }
}

#[cfg(unix)]
pub fn run(args: StatusArgs, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    use radiolink::queue::ByteQueue;

    use crate::exit::{link_error, queue_error, CliError, SUCCESS, USAGE};
    use crate::output::print_report;

    let layout = config
        .queue_config()
        .map_err(|err| link_error("ring layout", err))?;
    let mut queue = ByteQueue::map(&args.region, args.offset, layout)
        .map_err(|err| queue_error("map region", err))?;

    let slot = queue.slot_size() as u32;
    if args.cursor as usize >= queue.capacity() || args.cursor % slot != 0 {
        return Err(CliError::new(
            USAGE,
            format!("cursor {} is not a slot boundary", args.cursor),
        ));
    }
    queue.seek(args.cursor);

    let hardware_cursor = queue.pru_cursor();
    let out = StatusOutput {
        region: args.region.display().to_string(),
        capacity: queue.capacity(),
        slot_size: queue.slot_size(),
        length: queue.get_length(),
        pending_frames: queue.get_length() / slot,
        hardware_cursor_raw: queue.hardware_cursor_raw(),
        hardware_cursor,
        hardware_slot: hardware_cursor / slot,
        software_cursor: queue.internal_cursor(),
        lag_bytes: queue.hardware_lag(),
    };
    print_report(&out, format);
    Ok(SUCCESS)
}

#[cfg(not(unix))]
pub fn run(_args: StatusArgs, _config: &LinkConfig, _format: OutputFormat) -> CliResult<i32> {
    Err(crate::exit::CliError::new(
        crate::exit::USAGE,
        "mapped regions are only supported on unix",
    ))
}
