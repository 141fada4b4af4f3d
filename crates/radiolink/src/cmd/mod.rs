use clap::{Args, Subcommand};
use std::path::PathBuf;

use radiolink::LinkConfig;

use crate::exit::{io_error, link_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod info;
pub mod push;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame and encode a file into back-to-back ring slots.
    Encode(EncodeArgs),
    /// Decode ring slots back into the original bytes.
    Decode(DecodeArgs),
    /// Push a file's frames into a mapped ring region.
    Push(PushArgs),
    /// Show the shared fields of a mapped ring region.
    Status(StatusArgs),
    /// Show the frame, slot and region layout for the active configuration.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, config: &LinkConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, config, format),
        Command::Decode(args) => decode::run(args, config, format),
        Command::Push(args) => push::run(args, config, format),
        Command::Status(args) => status::run(args, config, format),
        Command::Info(args) => info::run(args, config, format),
        Command::Version(args) => version::run(args),
    }
}

/// Channel settings. Flags beat environment, which beats the config file.
#[derive(Args, Debug, Default)]
pub struct LinkArgs {
    /// JSON configuration file.
    #[arg(long, value_name = "FILE", env = "RADIOLINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// Payload bytes per frame.
    #[arg(long, value_name = "BYTES", env = "RADIOLINK_PAYLOAD_SIZE", global = true)]
    pub payload_size: Option<usize>,
    /// Slots in the ring.
    #[arg(long, value_name = "N", env = "RADIOLINK_QUEUE_FRAMES", global = true)]
    pub queue_frames: Option<usize>,
    /// Bias the firmware adds to its cursor.
    #[arg(long, value_name = "N", env = "RADIOLINK_CURSOR_BIAS", global = true)]
    pub cursor_bias: Option<u32>,
    /// Manchester-code encoded frames.
    #[arg(long, env = "RADIOLINK_LINE_CODING", global = true)]
    pub line_coding: bool,
}

impl LinkArgs {
    pub fn resolve(&self) -> CliResult<LinkConfig> {
        let mut config = match &self.config {
            Some(path) => LinkConfig::from_json_file(path)
                .map_err(|err| link_error("load config", err))?,
            None => LinkConfig::default(),
        };
        if let Some(payload_size) = self.payload_size {
            config.payload_size = payload_size;
        }
        if let Some(queue_frames) = self.queue_frames {
            config.queue_frames = queue_frames;
        }
        if let Some(cursor_bias) = self.cursor_bias {
            config.cursor_bias = cursor_bias;
        }
        config.line_coding |= self.line_coding;

        config
            .validate()
            .map_err(|err| link_error("invalid configuration", err))?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// File to encode.
    pub input: PathBuf,
    /// Where to write the encoded slots.
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Encoded slots, as written by `encode`.
    pub input: PathBuf,
    /// Where to write the recovered bytes.
    pub output: PathBuf,
    /// Fail when any codeword was uncorrectable or any line pair invalid.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Device or file holding the ring region.
    pub region: PathBuf,
    /// File to send.
    pub input: PathBuf,
    /// Byte offset of the region inside the device.
    #[arg(long, default_value = "0")]
    pub offset: u64,
    /// Zero the length field before pushing.
    #[arg(long)]
    pub reset: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Device or file holding the ring region.
    pub region: PathBuf,
    /// Byte offset of the region inside the device.
    #[arg(long, default_value = "0")]
    pub offset: u64,
    /// Software cursor to measure hardware lag against.
    #[arg(long, default_value = "0")]
    pub cursor: u32,
}

#[derive(Args, Debug, Default)]
pub struct InfoArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn read_input(path: &std::path::Path) -> CliResult<Vec<u8>> {
    std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err))
}

pub(crate) fn write_output(path: &std::path::Path, data: &[u8]) -> CliResult<()> {
    std::fs::write(path, data).map_err(|err| io_error(&format!("write {}", path.display()), err))
}
