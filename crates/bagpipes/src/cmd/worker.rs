use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bagpipes_fifo::{Attacher, PeerPaths, PipeNamespace};
use bagpipes_frame::{Frame, FrameConfig, FrameError, FramedChannel};
use tracing::{debug, info};

use crate::cmd::WorkerArgs;
use crate::exit::{fifo_error, frame_error, CliError, CliResult, INTERNAL, SUCCESS, TIMEOUT};
use crate::output::{print_message, Direction, OutputFormat};

pub fn run(args: WorkerArgs, format: OutputFormat) -> CliResult<i32> {
    let peer = PeerPaths::from_coordinator(&args.coordinator_in, &args.coordinator_out);
    let pair = PipeNamespace::attach(&peer).map_err(|err| fifo_error("attach failed", err))?;

    let config = FrameConfig {
        read_timeout: Some(args.poll_interval),
        ..FrameConfig::default()
    };
    let mut channel = FramedChannel::with_config(pair, config);
    info!(
        inbound = %peer.inbound().display(),
        outbound = %peer.outbound().display(),
        "worker attached"
    );

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut answered = 0usize;
    while running.load(Ordering::SeqCst) {
        let frame = match channel.recv_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(FrameError::ConnectionClosed) => {
                debug!("coordinator closed its end");
                break;
            }
            Err(err) => return Err(frame_error("receive failed", err)),
        };
        print_message(&frame, Direction::Received, "worker", format);

        let sent = answer(&mut channel, &frame, args.reply.as_deref())?;
        print_message(&sent, Direction::Sent, "worker", format);
        answered = answered.saturating_add(1);

        if let Some(count) = args.count {
            if answered >= count {
                break;
            }
        }
    }

    info!(answered, "worker done");
    Ok(SUCCESS)
}

/// Send the reply for `frame` and return what went out.
fn answer(
    channel: &mut FramedChannel<Attacher>,
    frame: &Frame,
    reply: Option<&str>,
) -> CliResult<Frame> {
    let payload = match reply {
        Some(text) => text.as_bytes(),
        None => frame.payload.as_ref(),
    };
    let sent = match reply {
        Some(text) => channel.send(text),
        None => channel.send(payload),
    };
    match sent {
        Ok(Some(_)) => Ok(Frame::for_payload(payload)),
        Ok(None) => Err(CliError::new(TIMEOUT, "reply failed: pipe not writable")),
        Err(err) => Err(frame_error("reply failed", err)),
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
