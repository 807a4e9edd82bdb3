use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};

use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};
use crate::receiver::{FrameReceiver, RxState};

const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete frames from any `Read` stream, such as a captured serial
/// log.
///
/// A rejected frame is returned as an error and the reader stays usable;
/// the next call continues with the bytes after the bad frame.
pub struct FrameReader<T> {
    inner: T,
    pending: BytesMut,
    receiver: FrameReceiver,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            pending: BytesMut::with_capacity(READ_CHUNK_SIZE),
            receiver: FrameReceiver::with_config(config),
        }
    }

    /// Read the next frame payload (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached,
    /// including EOF in the middle of a frame.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            while self.pending.has_remaining() {
                if let Some(result) = self.receiver.push(self.pending.get_u8()) {
                    return result;
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.receiver.state() == RxState::WaitingForFooter {
                    tracing::debug!(
                        buffered = self.receiver.buffered().len(),
                        "stream ended inside a frame"
                    );
                }
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend_from_slice(&chunk[..read]);
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

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        self.receiver.config()
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Bytes>;

    /// Yields every frame, good or bad, until the stream ends.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(FrameError::ConnectionClosed) => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::{encode_frame, DEFAULT_MAX_PAYLOAD};

    fn wire(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for payload in payloads {
            encode_frame(payload, DEFAULT_MAX_PAYLOAD, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"\x04\x01\x02"])));
        let payload = reader.read_frame().unwrap();
        assert_eq!(payload.as_ref(), &[0x04, 0x01, 0x02]);
    }

    #[test]
    fn read_multiple_frames() {
        let bytes = wire(&[b"\x01\x01", b"\x02\x01", b"\x03\x01"]);
        let frames: Vec<Bytes> = FrameReader::new(Cursor::new(bytes))
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].as_ref(), &[0x03, 0x01]);
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(&[b"\x66\x01\x02\x00"]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let payload = reader.read_frame().unwrap();
        assert_eq!(payload.as_ref(), &[0x66, 0x01, 0x02, 0x00]);
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut reader = FrameReader::new(Cursor::new(vec![0xB0, 0x04, 0x01]));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn bad_frame_does_not_poison_stream() {
        let mut bytes = vec![0xB0, 0x04, 0x01, 0x03, 0x03, 0x2F, 0xB1];
        bytes.extend(wire(&[b"\x04\x01\x02"]));

        let mut reader = FrameReader::new(Cursor::new(bytes));
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::CrcMismatch { .. })
        ));
        assert_eq!(reader.read_frame().unwrap().as_ref(), &[0x04, 0x01, 0x02]);
        assert!(reader.next().is_none());
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        assert_eq!(reader.config().max_payload_size, DEFAULT_MAX_PAYLOAD);
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: wire(&[b"ok"]),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        assert_eq!(framed.read_frame().unwrap().as_ref(), b"ok");
    }

    #[test]
    fn io_error_propagates() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::BrokenPipe))
            }
        }

        let err = FrameReader::new(Broken).read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
