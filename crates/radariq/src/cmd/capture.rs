use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use radariq_protocol::{Command, CommandResult, Radar};
use radariq_transport::SerialLink;
use tracing::{info, warn};

use crate::cmd::packet::PacketRecord;
use crate::cmd::{connect, CaptureArgs};
use crate::exit::{protocol_error, CliError, CliResult, SUCCESS};
use crate::output::{emit, OutputFormat};

pub fn run(args: CaptureArgs, format: OutputFormat) -> CliResult<i32> {
    let mut radar = connect(&args.device)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    // A finite capture ends by itself; stop printing once it has.
    let limit = args
        .count
        .or((args.frames > 0).then_some(usize::from(args.frames)));

    radar
        .start(args.frames)
        .map_err(|err| protocol_error("capture start failed", err))?;
    let streamed = stream(&mut radar, limit, args.stats, format, &running);

    if let Err(err) = radar.stop() {
        warn!(error = %err, "capture stop failed");
    }
    let printed = streamed?;
    info!(frames = printed, "capture finished");

    Ok(SUCCESS)
}

fn stream<L: SerialLink>(
    radar: &mut Radar<L>,
    limit: Option<usize>,
    stats: bool,
    format: OutputFormat,
    running: &AtomicBool,
) -> CliResult<usize> {
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let result = radar
            .read_serial()
            .map_err(|err| protocol_error("receive failed", err))?;
        let CommandResult::Received(command) = result else {
            continue;
        };

        match command {
            Command::PointCloudFrame | Command::ObjectTrackingFrame => {
                if !radar.data().is_complete() {
                    continue;
                }
                emit(&PacketRecord::from_result(radar, result), format);
                printed = printed.saturating_add(1);
                if limit.is_some_and(|limit| printed >= limit) {
                    break;
                }
            }
            Command::ProcessingStats | Command::PointCloudStats | Command::PowerStatus
                if stats =>
            {
                emit(&PacketRecord::from_result(radar, result), format);
            }
            _ => {}
        }
    }

    Ok(printed)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
