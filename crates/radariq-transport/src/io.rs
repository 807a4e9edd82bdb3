use std::io::{ErrorKind, Read, Write};
use std::time::Instant;

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::SerialLink;

/// Adapts any `Read + Write` stream into a [`SerialLink`].
///
/// A read that times out or would block counts as "no byte available", so
/// the stream should carry a short read timeout (serial ports opened through
/// [`crate::open`] use 10 ms). The clock is an [`Instant`] taken at
/// construction.
pub struct IoLink<T> {
    inner: T,
    epoch: Instant,
}

impl<T: Read + Write> IoLink<T> {
    /// Wrap a stream.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            epoch: Instant::now(),
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the link and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write> SerialLink for IoLink<T> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            return match self.inner.read(&mut byte) {
                Ok(0) => Err(TransportError::Closed),
                Ok(_) => Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    Ok(None)
                }
                Err(err) => Err(TransportError::Io(err)),
            };
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        trace!(len = bytes.len(), "wrote bytes");

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn millis(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl<T> std::fmt::Debug for IoLink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoLink").field("epoch", &self.epoch).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// In-memory duplex: reads from `input`, records writes in `output`.
    struct Duplex {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
        flushed: bool,
    }

    impl Duplex {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                output: Vec::new(),
                flushed: false,
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    #[test]
    fn reads_one_byte_at_a_time() {
        let mut link = IoLink::new(Duplex::new(&[0xB0, 0x01]));
        assert_eq!(link.read_byte().unwrap(), Some(0xB0));
        assert_eq!(link.read_byte().unwrap(), Some(0x01));
    }

    #[test]
    fn eof_reports_closed() {
        let mut link = IoLink::new(Duplex::new(&[]));
        assert!(matches!(link.read_byte(), Err(TransportError::Closed)));
    }

    #[test]
    fn write_bytes_writes_everything_and_flushes() {
        let mut link = IoLink::new(Duplex::new(&[]));
        link.write_bytes(&[1, 2, 3]).unwrap();

        let inner = link.into_inner();
        assert_eq!(inner.output, vec![1, 2, 3]);
        assert!(inner.flushed);
    }

    struct TimeoutThenByte {
        calls: u8,
    }

    impl Read for TimeoutThenByte {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.calls += 1;
            match self.calls {
                1 => Err(std::io::Error::from(ErrorKind::TimedOut)),
                2 => Err(std::io::Error::from(ErrorKind::WouldBlock)),
                3 => Err(std::io::Error::from(ErrorKind::Interrupted)),
                _ => {
                    buf[0] = 0x42;
                    Ok(1)
                }
            }
        }
    }

    impl Write for TimeoutThenByte {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn timeouts_mean_no_byte_and_interrupts_retry() {
        let mut link = IoLink::new(TimeoutThenByte { calls: 0 });
        assert_eq!(link.read_byte().unwrap(), None);
        assert_eq!(link.read_byte().unwrap(), None);
        assert_eq!(link.read_byte().unwrap(), Some(0x42));
    }

    struct ZeroWriter;

    impl Read for ZeroWriter {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn zero_length_write_reports_closed() {
        let mut link = IoLink::new(ZeroWriter);
        assert!(matches!(link.write_bytes(&[1]), Err(TransportError::Closed)));
    }

    #[test]
    fn clock_is_monotonic() {
        let link = IoLink::new(Duplex::new(&[]));
        let first = link.millis();
        let second = link.millis();
        assert!(second >= first);
    }
}
