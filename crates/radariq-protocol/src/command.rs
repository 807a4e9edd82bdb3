use std::fmt;

use bytes::{BufMut, BytesMut};
use serde::Serialize;

/// Command identifiers carried in byte 0 of every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Command {
    /// Text message pushed by the device.
    Message = 0x00,
    /// Firmware and hardware version.
    Version = 0x01,
    /// Serial number.
    Serial = 0x02,
    /// Reboot or factory reset.
    Reset = 0x03,
    /// Capture frame rate.
    FrameRate = 0x04,
    /// Capture mode.
    Mode = 0x05,
    /// Distance filter bounds.
    DistanceFilter = 0x06,
    /// Angle filter bounds.
    AngleFilter = 0x07,
    /// Moving-object filter.
    MovingFilter = 0x08,
    /// Persist settings to EEPROM.
    Save = 0x09,
    /// Point-cloud density.
    PointDensity = 0x10,
    /// Point-cloud sensitivity.
    Sensitivity = 0x11,
    /// Height filter bounds.
    HeightFilter = 0x12,
    /// Firmware versions running on the radar chip.
    IwrVersion = 0x14,
    /// Scene calibration.
    SceneCalibration = 0x15,
    /// Target object size for tracking.
    ObjectSize = 0x16,
    /// Start streaming frames.
    CaptureStart = 0x64,
    /// Stop streaming frames.
    CaptureStop = 0x65,
    /// Point-cloud sub-frame.
    PointCloudFrame = 0x66,
    /// Object-tracking sub-frame.
    ObjectTrackingFrame = 0x67,
    /// Processing statistics and chip temperatures.
    ProcessingStats = 0x68,
    /// Raw radar data. Recognised but not parsed.
    RawData = 0x69,
    /// Point-cloud processing statistics.
    PointCloudStats = 0x70,
    /// Power supply status.
    PowerStatus = 0x71,
}

impl Command {
    /// Every command, in wire-code order.
    pub const ALL: [Command; 24] = [
        Command::Message,
        Command::Version,
        Command::Serial,
        Command::Reset,
        Command::FrameRate,
        Command::Mode,
        Command::DistanceFilter,
        Command::AngleFilter,
        Command::MovingFilter,
        Command::Save,
        Command::PointDensity,
        Command::Sensitivity,
        Command::HeightFilter,
        Command::IwrVersion,
        Command::SceneCalibration,
        Command::ObjectSize,
        Command::CaptureStart,
        Command::CaptureStop,
        Command::PointCloudFrame,
        Command::ObjectTrackingFrame,
        Command::ProcessingStats,
        Command::RawData,
        Command::PointCloudStats,
        Command::PowerStatus,
    ];

    /// Wire code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Stable lowercase name, used in logs and CLI output.
    pub const fn name(self) -> &'static str {
        match self {
            Command::Message => "message",
            Command::Version => "version",
            Command::Serial => "serial",
            Command::Reset => "reset",
            Command::FrameRate => "frame_rate",
            Command::Mode => "mode",
            Command::DistanceFilter => "distance_filter",
            Command::AngleFilter => "angle_filter",
            Command::MovingFilter => "moving_filter",
            Command::Save => "save",
            Command::PointDensity => "point_density",
            Command::Sensitivity => "sensitivity",
            Command::HeightFilter => "height_filter",
            Command::IwrVersion => "iwr_version",
            Command::SceneCalibration => "scene_calibration",
            Command::ObjectSize => "object_size",
            Command::CaptureStart => "capture_start",
            Command::CaptureStop => "capture_stop",
            Command::PointCloudFrame => "point_cloud_frame",
            Command::ObjectTrackingFrame => "object_tracking_frame",
            Command::ProcessingStats => "processing_stats",
            Command::RawData => "raw_data",
            Command::PointCloudStats => "point_cloud_stats",
            Command::PowerStatus => "power_status",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        Command::ALL
            .iter()
            .copied()
            .find(|command| command.code() == code)
            .ok_or(code)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role tag carried in byte 1 of command payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Variant {
    /// Query sent by the host.
    Request = 0,
    /// Reply sent by the device.
    Response = 1,
    /// Mutation sent by the host.
    Set = 2,
}

impl TryFrom<u8> for Variant {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, u8> {
        match code {
            0 => Ok(Variant::Request),
            1 => Ok(Variant::Response),
            2 => Ok(Variant::Set),
            other => Err(other),
        }
    }
}

/// Outcome of one receive step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// No complete frame yet.
    None,
    /// A frame was decoded and dispatched.
    Received(Command),
    /// A frame arrived but failed to decode or parse.
    Error,
    /// A valid frame carried an unrecognised command byte.
    Unknown,
}

impl CommandResult {
    /// True while no frame has completed.
    pub fn is_none(&self) -> bool {
        matches!(self, CommandResult::None)
    }

    /// The dispatched command, if any.
    pub fn command(&self) -> Option<Command> {
        match self {
            CommandResult::Received(command) => Some(*command),
            _ => None,
        }
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::None => f.write_str("nothing"),
            CommandResult::Received(command) => write!(f, "{command}"),
            CommandResult::Error => f.write_str("a corrupt packet"),
            CommandResult::Unknown => f.write_str("an unknown command"),
        }
    }
}

/// Build a command payload: `[command, variant, args...]`.
pub fn build_request(command: Command, variant: Variant, args: &[u8]) -> BytesMut {
    let mut payload = BytesMut::with_capacity(2 + args.len());
    payload.put_u8(command.code());
    payload.put_u8(variant as u8);
    payload.put_slice(args);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_try_from() {
        for command in Command::ALL {
            assert_eq!(Command::try_from(command.code()), Ok(command));
        }
    }

    #[test]
    fn wire_codes_match_device_table() {
        assert_eq!(Command::FrameRate.code(), 0x04);
        assert_eq!(Command::PointDensity.code(), 0x10);
        assert_eq!(Command::ObjectSize.code(), 0x16);
        assert_eq!(Command::CaptureStart.code(), 0x64);
        assert_eq!(Command::PowerStatus.code(), 0x71);
    }

    #[test]
    fn unassigned_codes_are_rejected() {
        for code in [0x0A, 0x13, 0x17, 0x63, 0x72, 0xFF] {
            assert_eq!(Command::try_from(code), Err(code));
        }
    }

    #[test]
    fn variant_codes() {
        assert_eq!(Variant::try_from(2), Ok(Variant::Set));
        assert_eq!(Variant::try_from(3), Err(3));
    }

    #[test]
    fn request_layout() {
        let payload = build_request(Command::DistanceFilter, Variant::Set, &[0x64, 0x00, 0xC8, 0x00]);
        assert_eq!(payload.as_ref(), &[0x06, 0x02, 0x64, 0x00, 0xC8, 0x00]);

        let payload = build_request(Command::Version, Variant::Request, &[]);
        assert_eq!(payload.as_ref(), &[0x01, 0x00]);
    }

    #[test]
    fn result_helpers() {
        assert!(CommandResult::None.is_none());
        assert_eq!(
            CommandResult::Received(Command::Save).command(),
            Some(Command::Save)
        );
        assert_eq!(CommandResult::Unknown.command(), None);
        assert_eq!(
            CommandResult::Received(Command::FrameRate).to_string(),
            "frame_rate"
        );
    }
}
