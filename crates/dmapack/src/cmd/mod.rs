use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use dmapack_codec::{ChannelValue, Direction};
use dmapack_schema::Schema;

use crate::exit::{schema_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod inspect;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the packets and bit ranges of a layout.
    Inspect(InspectArgs),
    /// Decode FIFO words into channel values.
    Decode(DecodeArgs),
    /// Encode channel values into write-direction words.
    Encode(EncodeArgs),
    /// Run read/write cycles against a FIFO bridge socket.
    Run(RunArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Inspect(args) => inspect::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Run(args) => run::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DirectionArg {
    Read,
    Write,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Read => Direction::Read,
            DirectionArg::Write => Direction::Write,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Layout document (JSON).
    pub layout: PathBuf,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Layout document (JSON).
    pub layout: PathBuf,
    /// One word per packet: hex (0x...), decimal, or 64 binary digits.
    #[arg(required = true)]
    pub words: Vec<String>,
    /// Which direction's packets the words belong to.
    #[arg(long, value_enum, default_value = "read")]
    pub direction: DirectionArg,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Layout document (JSON).
    pub layout: PathBuf,
    /// Channel assignment NAME=VALUE (repeatable).
    #[arg(long, value_name = "NAME=VALUE")]
    pub set: Vec<String>,
    /// Reject out-of-range values instead of clamping.
    #[arg(long)]
    pub strict: bool,
    /// Fail when a write channel is not assigned instead of sending zero.
    #[arg(long)]
    pub require_all: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Layout document (JSON).
    pub layout: PathBuf,
    /// FIFO bridge socket path.
    pub socket: PathBuf,
    /// Number of cycles; 0 runs until interrupted.
    #[arg(long, default_value = "5")]
    pub count: u64,
    /// Channel assignment NAME=VALUE applied every cycle (repeatable).
    #[arg(long, value_name = "NAME=VALUE")]
    pub set: Vec<String>,
    /// FIFO read/write timeout (e.g. 2s, 500ms; at most 24h).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
    /// Reject out-of-range values instead of clamping.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn load_schema(path: &Path) -> CliResult<Schema> {
    Schema::from_file(path)
        .map_err(|err| schema_error(&format!("failed loading {}", path.display()), err))
}

pub(crate) fn parse_assignments(raw: &[String]) -> CliResult<Vec<(String, ChannelValue)>> {
    raw.iter().map(|item| parse_assignment(item)).collect()
}

fn parse_assignment(item: &str) -> CliResult<(String, ChannelValue)> {
    let (name, value) = item
        .split_once('=')
        .ok_or_else(|| CliError::new(USAGE, format!("expected NAME=VALUE, got '{item}'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::new(USAGE, format!("missing channel name in '{item}'")));
    }
    let value = value
        .parse::<ChannelValue>()
        .map_err(|err| CliError::new(USAGE, format!("--set {name}: {err}")))?;
    Ok((name.to_string(), value))
}

/// Longest FIFO timeout accepted on the command line.
pub(crate) const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    let duration = match unit {
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    };
    if duration > MAX_TIMEOUT {
        return Err(CliError::new(
            USAGE,
            format!("duration {input} exceeds maximum of {}s", MAX_TIMEOUT.as_secs()),
        ));
    }
    Ok(duration)
}
