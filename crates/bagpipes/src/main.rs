mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel, LogOptions};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "bagpipes",
    version,
    about = "Framed coordinator/worker messaging over named pipes"
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
        default_value = "info",
        env = "BAGPIPES_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit::USAGE
            } else {
                exit::SUCCESS
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    let log = LogOptions {
        format: cli.log_format,
        level: cli.log_level,
    };
    let role = match cli.command {
        Command::Worker(_) => "worker",
        _ => "coordinator",
    };
    init_logging(log, role);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format, log);

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
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from([
            "bagpipes",
            "run",
            "--message",
            "ping",
            "-m",
            "again",
            "--reply",
            "pong",
            "--timeout",
            "500ms",
        ])
        .expect("run args should parse");

        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.messages, vec!["ping", "again"]);
                assert_eq!(args.reply.as_deref(), Some("pong"));
                assert_eq!(args.prefix, "worker");
                assert_eq!(args.timeout, std::time::Duration::from_millis(500));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_requires_a_message() {
        let err = Cli::try_parse_from(["bagpipes", "run"]).expect_err("missing message");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_worker_subcommand_with_global_flags_first() {
        let cli = Cli::try_parse_from([
            "bagpipes",
            "--log-format",
            "json",
            "--log-level",
            "debug",
            "worker",
            "--coordinator-in",
            "/tmp/x/worker_0_in",
            "--coordinator-out",
            "/tmp/x/worker_0_out",
            "--count",
            "2",
        ])
        .expect("worker args should parse");

        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.log_level, LogLevel::Debug);
        match cli.command {
            Command::Worker(args) => {
                assert_eq!(args.count, Some(2));
                assert!(args.reply.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn worker_requires_both_paths() {
        let err = Cli::try_parse_from(["bagpipes", "worker", "--coordinator-in", "/tmp/a"])
            .expect_err("missing outbound path");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
