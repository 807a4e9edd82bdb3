use std::time::Duration;

use crate::command::{Command, CommandResult};

/// Errors that can occur in protocol operations.
///
/// Every error is scoped to the call that produced it; the connection stays
/// usable afterwards.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] radariq_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] radariq_frame::FrameError),

    /// No packet arrived before the response deadline.
    #[error("no response after {0:?}")]
    Timeout(Duration),

    /// A packet arrived, but not the reply the request was waiting for.
    #[error("expected {expected} response, got {received}")]
    UnexpectedResponse {
        expected: Command,
        received: CommandResult,
    },

    /// A setting value was rejected before contacting the device.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// A reply was too short or carried a value outside its enumeration.
    #[error("malformed {command} response: {reason}")]
    MalformedResponse { command: Command, reason: String },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
