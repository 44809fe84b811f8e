use std::process::{Child, Command, Stdio};

use bagpipes_fifo::{Creator, NamespaceConfig, PeerPaths, PipeNamespace};
use bagpipes_frame::{Frame, FrameConfig, FramedChannel, Payload};
use tracing::{debug, info, warn};

use crate::cmd::RunArgs;
use crate::exit::{
    fifo_error, frame_error, io_error, CliError, CliResult, FAILURE, SUCCESS, TIMEOUT,
};
use crate::logging::LogOptions;
use crate::output::{print_message, Direction, OutputFormat};

pub fn run(args: RunArgs, format: OutputFormat, log: LogOptions) -> CliResult<i32> {
    validate_text(&args)?;

    let config = NamespaceConfig {
        temp_root: args.temp_root.clone(),
        ..NamespaceConfig::default()
    };
    let namespace = PipeNamespace::with_config(&args.identity, config)
        .map_err(|err| fifo_error("namespace setup failed", err))?;
    let pair = namespace
        .create_pair(&args.prefix)
        .map_err(|err| fifo_error("fifo pair creation failed", err))?;

    let frame_config = FrameConfig {
        read_timeout: Some(args.timeout),
        write_timeout: Some(args.timeout),
        ..FrameConfig::default()
    };
    let mut channel = FramedChannel::with_config(pair, frame_config);

    let mut child = spawn_worker(&channel.peer_paths(), &args, log)?;
    info!(pid = child.id(), "worker spawned");

    let exchanged = exchange(&mut channel, &args.messages, format);
    if exchanged.is_err() {
        let _ = child.kill();
    }

    // Closing our ends is what tells the worker to stop.
    let teardown = channel.teardown(namespace);
    let status = child.wait().map_err(|err| io_error("waiting for worker failed", err));

    exchanged?;
    teardown.map_err(|err| fifo_error("teardown failed", err))?;
    let status = status?;
    if !status.success() {
        return Err(CliError::new(
            FAILURE,
            format!("worker exited unsuccessfully: {status}"),
        ));
    }

    Ok(SUCCESS)
}

/// Reject non-ASCII messages or reply text before any pipe exists.
fn validate_text(args: &RunArgs) -> CliResult<()> {
    for message in &args.messages {
        Payload::from(message.as_str())
            .as_bytes()
            .map_err(|err| frame_error("invalid message", err))?;
    }
    if let Some(reply) = &args.reply {
        Payload::from(reply.as_str())
            .as_bytes()
            .map_err(|err| frame_error("invalid reply", err))?;
    }
    Ok(())
}

fn spawn_worker(peer: &PeerPaths, args: &RunArgs, log: LogOptions) -> CliResult<Child> {
    let exe =
        std::env::current_exe().map_err(|err| io_error("locating own executable failed", err))?;
    let (coordinator_in, coordinator_out) = peer.coordinator_paths();

    let mut command = Command::new(exe);
    command
        .args(log.to_args())
        .arg("worker")
        .arg("--coordinator-in")
        .arg(coordinator_in)
        .arg("--coordinator-out")
        .arg(coordinator_out)
        .arg("--count")
        .arg(args.messages.len().to_string());
    if let Some(reply) = &args.reply {
        command.arg("--reply").arg(reply);
    }
    debug!(?command, "spawning worker");

    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|err| io_error("spawning worker failed", err))
}

fn exchange(
    channel: &mut FramedChannel<Creator>,
    messages: &[String],
    format: OutputFormat,
) -> CliResult<()> {
    for message in messages {
        match channel.send(message.as_str()) {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(CliError::new(TIMEOUT, "send failed: worker pipe not writable"));
            }
            Err(err) => return Err(frame_error("send failed", err)),
        }

        let reply = match channel.recv_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                warn!("no reply from worker");
                return Err(CliError::new(TIMEOUT, "receive failed: no reply from worker"));
            }
            Err(err) => return Err(frame_error("receive failed", err)),
        };
        report(&reply, format);
    }
    Ok(())
}

fn report(frame: &Frame, format: OutputFormat) {
    print_message(frame, Direction::Received, "coordinator", format);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::exit::DATA_INVALID;

    fn args(messages: &[&str], reply: Option<&str>) -> RunArgs {
        RunArgs {
            prefix: "worker".to_string(),
            identity: "0".to_string(),
            messages: messages.iter().map(|m| m.to_string()).collect(),
            reply: reply.map(str::to_string),
            timeout: Duration::from_secs(1),
            temp_root: None,
        }
    }

    #[test]
    fn ascii_messages_and_reply_are_accepted() {
        assert!(validate_text(&args(&["ping", ""], Some("pong"))).is_ok());
    }

    #[test]
    fn non_ascii_message_is_data_invalid() {
        let err = validate_text(&args(&["ok", "caf\u{e9}"], None)).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("invalid message"));
    }

    #[test]
    fn non_ascii_reply_is_data_invalid() {
        let err = validate_text(&args(&["ping"], Some("p\u{f6}ng"))).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("invalid reply"));
    }
}
