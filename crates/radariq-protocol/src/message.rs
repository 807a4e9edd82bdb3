use std::fmt;

use serde::Serialize;

use crate::fields::{c_str_at, u8_at};

/// Longest message text the device sends.
pub const MAX_MESSAGE_LEN: usize = 200;

const TEXT_OFFSET: usize = 4;

/// Severity tag of a device message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Temporary,
    Debug,
    Info,
    Warning,
    Error,
    Success,
    /// A type byte this SDK does not know.
    Other(u8),
}

impl MessageType {
    pub fn code(self) -> u8 {
        match self {
            MessageType::Temporary => 0,
            MessageType::Debug => 1,
            MessageType::Info => 2,
            MessageType::Warning => 3,
            MessageType::Error => 4,
            MessageType::Success => 5,
            MessageType::Other(code) => code,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MessageType::Temporary => "TEMPORARY",
            MessageType::Debug => "DEBUG",
            MessageType::Info => "INFO",
            MessageType::Warning => "WARNING",
            MessageType::Error => "ERROR",
            MessageType::Success => "SUCCESS",
            MessageType::Other(_) => "UNKNOWN",
        }
    }
}

impl From<u8> for MessageType {
    fn from(code: u8) -> Self {
        match code {
            0 => MessageType::Temporary,
            1 => MessageType::Debug,
            2 => MessageType::Info,
            3 => MessageType::Warning,
            4 => MessageType::Error,
            5 => MessageType::Success,
            other => MessageType::Other(other),
        }
    }
}

/// Warning/error code of a device message. Zero for general messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCode {
    General,
    FrameRateTooHigh,
    CalibrationFailed,
    IwrCommsTimeout,
    InvalidCommand,
    InvalidValue,
    PacketOverflow,
    Other(u8),
}

impl MessageCode {
    pub fn code(self) -> u8 {
        match self {
            MessageCode::General => 0,
            MessageCode::FrameRateTooHigh => 1,
            MessageCode::CalibrationFailed => 2,
            MessageCode::IwrCommsTimeout => 3,
            MessageCode::InvalidCommand => 100,
            MessageCode::InvalidValue => 101,
            MessageCode::PacketOverflow => 102,
            MessageCode::Other(code) => code,
        }
    }
}

impl From<u8> for MessageCode {
    fn from(code: u8) -> Self {
        match code {
            0 => MessageCode::General,
            1 => MessageCode::FrameRateTooHigh,
            2 => MessageCode::CalibrationFailed,
            3 => MessageCode::IwrCommsTimeout,
            100 => MessageCode::InvalidCommand,
            101 => MessageCode::InvalidValue,
            102 => MessageCode::PacketOverflow,
            other => MessageCode::Other(other),
        }
    }
}

/// A text message pushed by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceMessage {
    pub kind: MessageType,
    pub code: MessageCode,
    pub text: String,
}

impl DeviceMessage {
    /// Parse a message packet: type at 2, code at 3, NUL-terminated text
    /// from 4.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        Some(Self {
            kind: MessageType::from(u8_at(payload, 2)?),
            code: MessageCode::from(u8_at(payload, 3)?),
            text: c_str_at(payload, TEXT_OFFSET, MAX_MESSAGE_LEN),
        })
    }

    /// The line forwarded to the log sink.
    pub fn log_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DeviceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Radar message - {} ({}/{}): {}",
            self.kind.label(),
            self.kind.code(),
            self.code.code(),
            self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_packet() {
        let payload = b"\x00\x01\x03\x01frame rate limited\x00\xAA\xBB";
        let msg = DeviceMessage::parse(payload).unwrap();

        assert_eq!(msg.kind, MessageType::Warning);
        assert_eq!(msg.code, MessageCode::FrameRateTooHigh);
        assert_eq!(msg.text, "frame rate limited");
        assert_eq!(
            msg.log_line(),
            "Radar message - WARNING (3/1): frame rate limited"
        );
    }

    #[test]
    fn text_is_bounded() {
        let mut payload = vec![0x00, 0x01, 0x02, 0x00];
        payload.extend(std::iter::repeat(b'a').take(MAX_MESSAGE_LEN + 20));

        let msg = DeviceMessage::parse(&payload).unwrap();
        assert_eq!(msg.text.len(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn unknown_codes_are_kept_raw() {
        let msg = DeviceMessage::parse(&[0x00, 0x01, 0x09, 0x37]).unwrap();
        assert_eq!(msg.kind, MessageType::Other(9));
        assert_eq!(msg.code, MessageCode::Other(0x37));
        assert!(msg.text.is_empty());
        assert_eq!(MessageCode::from(101), MessageCode::InvalidValue);
    }

    #[test]
    fn header_is_required() {
        assert!(DeviceMessage::parse(&[0x00, 0x01, 0x02]).is_none());
    }
}
