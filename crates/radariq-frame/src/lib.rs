//! Serial framing for the RadarIQ M1 radar.
//!
//! Every packet on the wire is bracketed and byte-stuffed:
//! - a head marker `0xB0`
//! - the payload, with `0xB0`/`0xB1`/`0xB2` escaped as `0xB2, byte ^ 0x04`
//! - a big-endian CRC-16 of the unescaped payload, escaped the same way
//! - a foot marker `0xB1`
//!
//! [`FrameReceiver`] reassembles frames one byte at a time, which is all a
//! polled serial loop can offer. [`FrameReader`] drives the same state
//! machine from any blocking `Read`.

pub mod codec;
pub mod error;
pub mod reader;
pub mod receiver;

pub use codec::{
    crc16, decode_frame, encode_frame, FrameConfig, CRC_SIZE, DEFAULT_MAX_PAYLOAD, ESC, ESC_XOR,
    FOOT, HEAD, MAX_DECODED_PAYLOAD, RX_BUFFER_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use receiver::{FrameReceiver, RxState};
