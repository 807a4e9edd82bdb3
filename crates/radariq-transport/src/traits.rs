use crate::error::Result;

/// Capabilities a radar connection borrows from its host.
///
/// Every method is called from the thread that drives the receive step.
/// `read_byte` must not block indefinitely: returning `Ok(None)` means
/// "nothing available yet" and the caller will poll again.
pub trait SerialLink {
    /// Read one byte if one is available.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write the whole buffer. Partial writes are the implementation's problem.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Monotonic milliseconds since an arbitrary epoch.
    fn millis(&self) -> u64;

    /// Diagnostic sink for device messages and protocol warnings.
    ///
    /// The connection already emits structured `tracing` events for the same
    /// lines, so the default only echoes them at debug level.
    fn log(&mut self, message: &str) {
        tracing::debug!(target: "radariq::link", "{message}");
    }
}

impl<L: SerialLink + ?Sized> SerialLink for &mut L {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }

    fn millis(&self) -> u64 {
        (**self).millis()
    }

    fn log(&mut self, message: &str) {
        (**self).log(message)
    }
}

impl<L: SerialLink + ?Sized> SerialLink for Box<L> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }

    fn millis(&self) -> u64 {
        (**self).millis()
    }

    fn log(&mut self, message: &str) {
        (**self).log(message)
    }
}
