//! Printable views of received packets, shared by `capture` and `decode`.

use radariq_protocol::{
    ChipTemperatures, Command, CommandResult, DeviceMessage, PointCloudStats, ProcessingStats,
    Radar, RadarData,
};
use radariq_transport::SerialLink;
use serde::Serialize;

use crate::output::Render;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PacketRecord<'a> {
    Frame {
        data: &'a RadarData,
    },
    ProcessingStats {
        stats: &'a ProcessingStats,
        temperatures: &'a ChipTemperatures,
    },
    PointCloudStats {
        stats: &'a PointCloudStats,
    },
    Power {
        good: bool,
    },
    Message {
        message: &'a DeviceMessage,
    },
    /// A recognised packet with nothing to show beyond its size.
    Reply {
        command: Command,
        size: usize,
    },
    Unknown {
        code: Option<u8>,
        size: usize,
    },
    Rejected {
        reason: String,
    },
}

impl<'a> PacketRecord<'a> {
    /// View the snapshot `result` refers to.
    pub fn from_result<L: SerialLink>(radar: &'a Radar<L>, result: CommandResult) -> Self {
        let packet = radar.last_packet();
        match result {
            CommandResult::Received(Command::PointCloudFrame | Command::ObjectTrackingFrame) => {
                PacketRecord::Frame { data: radar.data() }
            }
            CommandResult::Received(Command::ProcessingStats) => PacketRecord::ProcessingStats {
                stats: radar.processing_stats(),
                temperatures: radar.chip_temperatures(),
            },
            CommandResult::Received(Command::PointCloudStats) => PacketRecord::PointCloudStats {
                stats: radar.point_cloud_stats(),
            },
            CommandResult::Received(Command::PowerStatus) => PacketRecord::Power {
                good: radar.is_power_good(),
            },
            CommandResult::Received(command) => match (command, radar.last_message()) {
                (Command::Message, Some(message)) => PacketRecord::Message { message },
                _ => PacketRecord::Reply {
                    command,
                    size: packet.len(),
                },
            },
            CommandResult::Unknown => PacketRecord::Unknown {
                code: packet.first().copied(),
                size: packet.len(),
            },
            CommandResult::Error | CommandResult::None => PacketRecord::Rejected {
                reason: "malformed payload".to_string(),
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            PacketRecord::Frame { data } => match data {
                RadarData::PointCloud(_) => "point_cloud",
                RadarData::ObjectTracking(_) => "object_tracking",
            },
            PacketRecord::ProcessingStats { .. } => "processing_stats",
            PacketRecord::PointCloudStats { .. } => "point_cloud_stats",
            PacketRecord::Power { .. } => "power",
            PacketRecord::Message { .. } => "message",
            PacketRecord::Reply { .. } => "reply",
            PacketRecord::Unknown { .. } => "unknown",
            PacketRecord::Rejected { .. } => "rejected",
        }
    }

    fn summary(&self) -> String {
        match self {
            PacketRecord::Frame { data } => format!(
                "{} items{}",
                data.len(),
                if data.is_complete() { "" } else { " (partial)" }
            ),
            PacketRecord::ProcessingStats { stats, .. } => format!(
                "cpu {}% active, {}% inter-frame",
                stats.active_frame_cpu_load, stats.inter_frame_cpu_load
            ),
            PacketRecord::PointCloudStats { stats } => format!(
                "{} transmitted, {} filtered",
                stats.transmitted_points, stats.filtered_points
            ),
            PacketRecord::Power { good } => {
                if *good { "power good" } else { "power fault" }.to_string()
            }
            PacketRecord::Message { message } => message.log_line(),
            PacketRecord::Reply { command, size } => format!("{command} ({size} bytes)"),
            PacketRecord::Unknown { code, size } => match code {
                Some(code) => format!("command 0x{code:02x} ({size} bytes)"),
                None => format!("{size} bytes"),
            },
            PacketRecord::Rejected { reason } => reason.clone(),
        }
    }
}

impl Render for PacketRecord<'_> {
    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("type".to_string(), self.kind().to_string()),
            ("summary".to_string(), self.summary()),
        ];

        match self {
            PacketRecord::Frame {
                data: RadarData::PointCloud(frame),
            } => rows.extend(frame.items().iter().enumerate().map(|(i, p)| {
                (
                    format!("point {i}"),
                    format!(
                        "x={} y={} z={} intensity={} velocity={}",
                        p.x, p.y, p.z, p.intensity, p.velocity
                    ),
                )
            })),
            PacketRecord::Frame {
                data: RadarData::ObjectTracking(frame),
            } => rows.extend(frame.items().iter().map(|o| {
                (
                    format!("object {}", o.target_id),
                    format!(
                        "pos=({}, {}, {}) vel=({}, {}, {}) acc=({}, {}, {})",
                        o.position.x,
                        o.position.y,
                        o.position.z,
                        o.velocity.x,
                        o.velocity.y,
                        o.velocity.z,
                        o.acceleration.x,
                        o.acceleration.y,
                        o.acceleration.z
                    ),
                )
            })),
            PacketRecord::ProcessingStats {
                stats,
                temperatures,
            } => {
                rows.push((
                    "uart transmit".to_string(),
                    format!("{} us", stats.uart_transmit_time),
                ));
                rows.push((
                    "temperatures".to_string(),
                    format!(
                        "sensor {}/{} pm {} rx {}/{}/{}/{} tx {}/{}/{}",
                        temperatures.sensor0,
                        temperatures.sensor1,
                        temperatures.power_management,
                        temperatures.rx0,
                        temperatures.rx1,
                        temperatures.rx2,
                        temperatures.rx3,
                        temperatures.tx0,
                        temperatures.tx1,
                        temperatures.tx2
                    ),
                ));
            }
            _ => {}
        }
        rows
    }

    fn raw(&self) -> String {
        format!("{} {}", self.kind(), self.summary())
    }
}

/// One packet of a decoded recording.
#[derive(Serialize)]
pub struct DecodedPacket<'a> {
    pub index: usize,
    #[serde(flatten)]
    pub record: PacketRecord<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl Render for DecodedPacket<'_> {
    fn rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![("packet".to_string(), self.index.to_string())];
        rows.extend(self.record.rows());
        if let Some(payload) = &self.payload {
            rows.push(("payload".to_string(), payload.clone()));
        }
        rows
    }

    fn raw(&self) -> String {
        match &self.payload {
            Some(payload) => format!("{} {} | {payload}", self.index, self.record.raw()),
            None => format!("{} {}", self.index, self.record.raw()),
        }
    }
}
