mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, LinkArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "radiolink",
    version,
    about = "Golay-protected framing into a shared-memory radio ring"
)]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "RADIOLINK_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(flatten)]
    link: LinkArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cli
        .link
        .resolve()
        .and_then(|config| cmd::run(cli.command, &config, format));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from(["radiolink", "encode", "in.bin", "out.bin"])
            .expect("encode args should parse");
        assert!(matches!(cli.command, Command::Encode(_)));
    }

    #[test]
    fn link_flags_are_global() {
        let cli = Cli::try_parse_from([
            "radiolink",
            "info",
            "--payload-size",
            "97",
            "--line-coding",
        ])
        .expect("global link flags should parse after the subcommand");

        let config = cli.link.resolve().expect("97-byte payload is valid");
        assert_eq!(config.payload_size, 97);
        assert!(config.line_coding);
        assert_eq!(config.slot_size(), 396);
    }

    #[test]
    fn parses_push_with_offset() {
        let cli = Cli::try_parse_from([
            "radiolink",
            "push",
            "/dev/uio0",
            "data.bin",
            "--offset",
            "4096",
            "--reset",
        ])
        .expect("push args should parse");

        match cli.command {
            Command::Push(args) => {
                assert_eq!(args.offset, 4096);
                assert!(args.reset);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        let err = Cli::try_parse_from(["radiolink", "info", "--format", "raw"])
            .expect_err("raw output is not offered");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
