//! Drive the SDK against a scripted device, no hardware needed.
//!
//! Run with:
//!   cargo run --example simulated-device --features mock

use bytes::BytesMut;
use radariq::frame::{encode_frame, DEFAULT_MAX_PAYLOAD};
use radariq::transport::MockLink;
use radariq::{CommandResult, Radar};

fn wire(payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::new();
    // Demo payloads are well under the limit.
    let _ = encode_frame(payload, DEFAULT_MAX_PAYLOAD, &mut buf);
    buf.to_vec()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut frame_rate = 10u8;
    let mut link = MockLink::new();
    link.on_write(move |request| {
        // request: [HEAD, command, variant, args..., crc, crc, FOOT]
        match (request.get(1), request.get(2)) {
            (Some(0x04), Some(0x02)) => {
                frame_rate = request[3];
                Some(wire(&[0x04, 0x01, frame_rate]))
            }
            (Some(0x04), Some(0x00)) => Some(wire(&[0x04, 0x01, frame_rate])),
            (Some(0x64), _) => {
                let mut stream = wire(b"\x00\x01\x02\x00capture started\x00");
                stream.extend(wire(&[
                    0x66, 0x01, 0x02, 0x02, 0x10, 0x00, 0xF0, 0xFF, 0xE8, 0x03, 0xC8, 0x0C, 0xFE,
                    0x20, 0x00, 0x00, 0x00, 0xD0, 0x07, 0x40, 0x00, 0x00,
                ]));
                Some(stream)
            }
            _ => None,
        }
    });

    let mut radar = Radar::new(link);
    println!("set frame rate: {:?}", radar.set_frame_rate(50)?);
    println!("frame rate is now {}", radar.frame_rate()?);

    radar.start(1)?;
    while radar.link().rx_remaining() > 0 {
        if let CommandResult::Received(command) = radar.read_serial()? {
            println!("received {command}");
        }
    }
    println!("device said: {:?}", radar.link().logs());
    if let Some(cloud) = radar.data().as_point_cloud() {
        for point in cloud.items() {
            println!("{point:?}");
        }
    }

    Ok(())
}
