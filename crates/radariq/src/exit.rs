use std::fmt;
use std::io;

use radariq_frame::FrameError;
use radariq_protocol::{Outcome, ProtocolError};
use radariq_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
/// A setting was out of range and the clamped value was applied.
pub const ADJUSTED: i32 = 2;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn outcome_code(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Ok => SUCCESS,
        Outcome::Adjusted => ADJUSTED,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::Open { ref source, .. } => {
            let code = match source.kind() {
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
                serialport::ErrorKind::InvalidInput => USAGE,
                _ => TRANSPORT_ERROR,
            };
            CliError::new(code, format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    match err {
        ProtocolError::Transport(err) => transport_error(context, err),
        ProtocolError::Frame(err) => frame_error(context, err),
        ProtocolError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        ProtocolError::InvalidSetting(_) => CliError::new(USAGE, format!("{context}: {err}")),
        ProtocolError::MalformedResponse { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ProtocolError::UnexpectedResponse { .. } => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use radariq_protocol::{Command, CommandResult};

    use super::*;

    #[test]
    fn protocol_errors_map_to_exit_codes() {
        let timeout = protocol_error("get", ProtocolError::Timeout(Duration::from_secs(1)));
        assert_eq!(timeout.code, TIMEOUT);

        let unexpected = protocol_error(
            "get",
            ProtocolError::UnexpectedResponse {
                expected: Command::FrameRate,
                received: CommandResult::Error,
            },
        );
        assert_eq!(unexpected.code, FAILURE);

        let crc = protocol_error(
            "get",
            ProtocolError::Frame(FrameError::CrcMismatch {
                expected: 1,
                computed: 2,
            }),
        );
        assert_eq!(crc.code, DATA_INVALID);
        assert!(crc.message.starts_with("get: "));
    }

    #[test]
    fn adjusted_outcome_has_its_own_code() {
        assert_eq!(outcome_code(Outcome::Ok), SUCCESS);
        assert_eq!(outcome_code(Outcome::Adjusted), ADJUSTED);
    }
}
