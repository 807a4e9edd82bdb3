//! Stream point-cloud frames from a radar on a serial port.
//!
//! Run with:
//!   cargo run --example point-cloud --features serial -- /dev/ttyUSB0

use radariq::protocol::RadarData;
use radariq::transport::{open, SerialConfig};
use radariq::{CaptureMode, CommandResult, Radar};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let mut radar = Radar::new(open(&SerialConfig::new(port))?);
    let versions = radar.version()?;
    eprintln!(
        "firmware {} hardware {} serial {}",
        versions.firmware,
        versions.hardware,
        radar.serial_number()?
    );

    radar.set_mode(CaptureMode::PointCloud)?;
    radar.set_frame_rate(5)?;
    radar.set_distance_filter(0, 5_000)?;

    radar.start(20)?;
    let mut frames = 0;
    while frames < 20 {
        if radar.read_serial()? != CommandResult::Received(radariq::Command::PointCloudFrame) {
            continue;
        }
        let RadarData::PointCloud(cloud) = radar.data() else {
            continue;
        };
        if !cloud.is_complete() {
            continue;
        }
        frames += 1;

        let nearest = cloud
            .items()
            .iter()
            .min_by_key(|p| i32::from(p.x).pow(2) + i32::from(p.y).pow(2));
        match nearest {
            Some(p) => println!(
                "frame {frames}: {} points, nearest at ({}, {}, {}) mm",
                cloud.len(),
                p.x,
                p.y,
                p.z
            ),
            None => println!("frame {frames}: empty"),
        }
    }
    radar.stop()?;

    Ok(())
}
