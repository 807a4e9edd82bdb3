use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::codec::{decode_frame, FrameConfig, FOOT, HEAD};
use crate::error::{FrameError, Result};

/// Receive state of a [`FrameReceiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RxState {
    /// Discarding bytes until a head marker arrives.
    #[default]
    WaitingForHeader,
    /// Collecting bytes until a foot marker arrives.
    WaitingForFooter,
}

/// Byte-at-a-time frame reassembly.
///
/// A head marker always starts a new frame, discarding any partial one. A
/// foot marker always ends the current frame and returns the receiver to
/// [`RxState::WaitingForHeader`], whether or not the frame decodes. Bytes
/// past the buffer capacity are dropped and the frame is rejected with
/// [`FrameError::Overflow`] once its foot arrives.
#[derive(Debug)]
pub struct FrameReceiver {
    state: RxState,
    buf: BytesMut,
    overflowed: bool,
    config: FrameConfig,
}

impl FrameReceiver {
    /// Create a receiver with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a receiver with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            state: RxState::WaitingForHeader,
            buf: BytesMut::with_capacity(config.max_frame_size),
            overflowed: false,
            config,
        }
    }

    /// Feed one byte.
    ///
    /// Returns `Some` when the byte was a foot marker that closed a frame:
    /// the decoded payload, or the reason the frame was rejected.
    pub fn push(&mut self, byte: u8) -> Option<Result<Bytes>> {
        if byte == HEAD {
            if self.state == RxState::WaitingForFooter {
                debug!(discarded = self.buf.len(), "head marker restarted frame");
            }
            self.start_frame();
            return None;
        }

        match self.state {
            RxState::WaitingForHeader => {
                trace!(byte, "discarding byte outside frame");
                None
            }
            RxState::WaitingForFooter if byte == FOOT => Some(self.finish_frame()),
            RxState::WaitingForFooter => {
                self.store(byte);
                None
            }
        }
    }

    /// Current receive state.
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Raw bytes of the frame being collected.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Drop any partial frame and wait for the next head marker.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.overflowed = false;
        self.state = RxState::WaitingForHeader;
    }

    /// Current receiver configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn start_frame(&mut self) {
        self.buf.clear();
        self.buf.put_u8(HEAD);
        self.overflowed = false;
        self.state = RxState::WaitingForFooter;
    }

    fn store(&mut self, byte: u8) {
        if self.buf.len() >= self.config.max_frame_size {
            if !self.overflowed {
                debug!(
                    capacity = self.config.max_frame_size,
                    "receive buffer full, dropping bytes"
                );
            }
            self.overflowed = true;
        } else {
            self.buf.put_u8(byte);
        }
    }

    fn finish_frame(&mut self) -> Result<Bytes> {
        self.store(FOOT);
        let result = if self.overflowed {
            Err(FrameError::Overflow {
                capacity: self.config.max_frame_size,
            })
        } else {
            decode_frame(&self.buf, self.config.max_decoded_payload())
        };
        self.reset();

        if let Err(err) = &result {
            debug!(error = %err, "rejected frame");
        }
        result
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}
