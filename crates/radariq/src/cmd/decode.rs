use std::fs::File;
use std::io::{self, BufReader};

use radariq_frame::{FrameError, FrameReader};
use radariq_protocol::Radar;
use radariq_transport::IoLink;
use tracing::info;

use crate::cmd::packet::{DecodedPacket, PacketRecord};
use crate::cmd::DecodeArgs;
use crate::exit::{io_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{emit, hex, OutputFormat};

/// Decode a recorded UART stream without a device attached.
///
/// Exits with `DATA_INVALID` if any frame was rejected.
pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let file = File::open(&args.file)
        .map_err(|err| io_error(&format!("open {} failed", args.file.display()), err))?;
    let frames = FrameReader::new(BufReader::new(file));
    // Offline: nothing is ever read from or written to this link.
    let mut radar = Radar::new(IoLink::new(io::empty()));

    let mut decoded = 0usize;
    let mut rejected = 0usize;

    for (index, frame) in frames.enumerate() {
        let (record, payload) = match frame {
            Ok(payload) => {
                decoded += 1;
                let shown = args.payload.then(|| hex(&payload));
                let result = radar.process_packet(payload);
                (PacketRecord::from_result(&radar, result), shown)
            }
            Err(FrameError::Io(err)) => return Err(io_error("read failed", err)),
            Err(err) => {
                rejected += 1;
                (
                    PacketRecord::Rejected {
                        reason: err.to_string(),
                    },
                    None,
                )
            }
        };

        emit(
            &DecodedPacket {
                index,
                record,
                payload,
            },
            format,
        );
    }

    info!(decoded, rejected, "decode finished");
    Ok(if rejected == 0 { SUCCESS } else { DATA_INVALID })
}
