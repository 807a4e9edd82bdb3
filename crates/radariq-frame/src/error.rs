/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The CRC trailer does not match the decoded payload.
    #[error("CRC mismatch (frame carried {expected:#06x}, computed {computed:#06x})")]
    CrcMismatch { expected: u16, computed: u16 },

    /// The frame did not fit the receive buffer.
    #[error("frame exceeds receive buffer ({capacity} bytes)")]
    Overflow { capacity: usize },

    /// The decoded frame is too short to carry a CRC trailer.
    #[error("frame too short ({len} decoded bytes)")]
    TooShort { len: usize },

    /// An escape byte was the last byte before the foot marker.
    #[error("escape byte with nothing to escape")]
    DanglingEscape,

    /// The raw buffer does not end with a foot marker.
    #[error("frame is not terminated by a foot marker")]
    Unterminated,

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended.
    #[error("stream closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
