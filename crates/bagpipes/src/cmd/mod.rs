use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::exit::CliResult;
use crate::logging::LogOptions;
use crate::output::OutputFormat;

pub mod doctor;
pub mod run;
pub mod version;
pub mod worker;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a fifo pair, spawn a worker on it, and exchange messages.
    Run(RunArgs),
    /// Attach to a coordinator's fifo pair and answer each message.
    Worker(WorkerArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, log: LogOptions) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format, log),
        Command::Worker(args) => worker::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pipe name prefix.
    #[arg(long, default_value = "worker")]
    pub prefix: String,
    /// Pair identity used in pipe names.
    #[arg(long, default_value = "0")]
    pub identity: String,
    /// Text message to send (repeatable; ASCII only).
    #[arg(long = "message", short = 'm', required = true)]
    pub messages: Vec<String>,
    /// Fixed reply the worker sends back. Default: echo.
    #[arg(long)]
    pub reply: Option<String>,
    /// Longest single wait for the worker (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", value_parser = parse_duration)]
    pub timeout: Duration,
    /// Directory to create the private pipe directory in.
    #[arg(long, value_name = "DIR")]
    pub temp_root: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WorkerArgs {
    /// The coordinator's inbound pipe (this worker writes to it).
    #[arg(long, value_name = "PATH")]
    pub coordinator_in: PathBuf,
    /// The coordinator's outbound pipe (this worker reads from it).
    #[arg(long, value_name = "PATH")]
    pub coordinator_out: PathBuf,
    /// Fixed reply. Default: echo each message back.
    #[arg(long)]
    pub reply: Option<String>,
    /// Exit after answering N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// How often to check for shutdown while idle (e.g. 250ms).
    #[arg(long, default_value = "250ms", value_parser = parse_duration)]
    pub poll_interval: Duration,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `500ms`, or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
