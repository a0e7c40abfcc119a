mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "dmapack", version, about = "DMA FIFO channel packing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

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
    fn parses_encode_with_repeated_sets() {
        let cli = Cli::try_parse_from([
            "dmapack",
            "encode",
            "layout.json",
            "--set",
            "Start=true",
            "--set",
            "Setpoint=5",
        ])
        .expect("encode args should parse");

        match cli.command {
            Command::Encode(args) => assert_eq!(args.set.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_decode_words() {
        let cli = Cli::try_parse_from(["dmapack", "decode", "layout.json", "0x1", "42"])
            .expect("decode args should parse");
        assert!(matches!(cli.command, Command::Decode(ref args) if args.words.len() == 2));
    }

    #[test]
    fn decode_requires_a_word() {
        let err = Cli::try_parse_from(["dmapack", "decode", "layout.json"])
            .expect_err("missing words should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from([
            "dmapack",
            "--format",
            "json",
            "run",
            "layout.json",
            "/tmp/fifo.sock",
            "--count",
            "3",
            "--timeout",
            "500ms",
        ])
        .expect("run args should parse");
        assert!(matches!(cli.command, Command::Run(_)));
    }
}
