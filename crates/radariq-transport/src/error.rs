/// Errors raised by a serial link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[cfg(feature = "serial")]
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },

    /// Failed to enumerate serial devices.
    #[cfg(feature = "serial")]
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(serialport::Error),

    /// An I/O error occurred on the underlying stream.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reached end-of-file or accepted zero bytes.
    #[error("serial link closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
