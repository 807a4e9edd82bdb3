use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start-of-frame marker.
pub const HEAD: u8 = 0xB0;

/// End-of-frame marker.
pub const FOOT: u8 = 0xB1;

/// Escape marker. The following byte is XORed with [`ESC_XOR`].
pub const ESC: u8 = 0xB2;

/// Mask applied to an escaped byte.
pub const ESC_XOR: u8 = 0x04;

/// CRC trailer size in bytes.
pub const CRC_SIZE: usize = 2;

/// Capacity of the device-side receive buffer, markers included.
pub const RX_BUFFER_SIZE: usize = 256;

/// Largest payload guaranteed to fit [`RX_BUFFER_SIZE`] even if every byte
/// needs escaping.
pub const DEFAULT_MAX_PAYLOAD: usize = (RX_BUFFER_SIZE - 2) / 2 - CRC_SIZE;

/// Largest payload a frame of [`RX_BUFFER_SIZE`] raw bytes can carry when
/// nothing in it is escaped.
pub const MAX_DECODED_PAYLOAD: usize = RX_BUFFER_SIZE - 2 - CRC_SIZE;

/// CRC-16/CCITT over `data` (polynomial 0x1021, initial value 0xFFFF, no
/// reflection, no final XOR).
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0xFFFF_u16, |crc, &byte| {
        let mut x = (crc >> 8) as u8 ^ byte;
        x ^= x >> 4;
        let x = u16::from(x);
        (crc << 8) ^ (x << 12) ^ (x << 5) ^ x
    })
}

/// True for bytes that must be escaped on the wire.
pub fn is_control(byte: u8) -> bool {
    matches!(byte, HEAD | FOOT | ESC)
}

fn put_escaped(dst: &mut BytesMut, byte: u8) {
    if is_control(byte) {
        dst.put_u8(ESC);
        dst.put_u8(byte ^ ESC_XOR);
    } else {
        dst.put_u8(byte);
    }
}

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────────────────┬──────────────────────┬──────┐
/// │ 0xB0 │ payload (escaped)    │ CRC-16 BE (escaped)  │ 0xB1 │
/// └──────┴──────────────────────┴──────────────────────┴──────┘
/// ```
///
/// The CRC is computed over the unescaped payload.
pub fn encode_frame(payload: &[u8], max_payload: usize, dst: &mut BytesMut) -> Result<()> {
    if payload.len() > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: max_payload,
        });
    }

    let crc = crc16(payload);
    dst.reserve(2 + (payload.len() + CRC_SIZE) * 2);
    dst.put_u8(HEAD);
    for &byte in payload {
        put_escaped(dst, byte);
    }
    for byte in crc.to_be_bytes() {
        put_escaped(dst, byte);
    }
    dst.put_u8(FOOT);
    Ok(())
}

/// Decode one raw frame, from its head marker up to and including the foot
/// marker, and return the CRC-checked payload.
///
/// Head markers inside the frame are skipped.
pub fn decode_frame(raw: &[u8], max_payload: usize) -> Result<Bytes> {
    let Some((&last, body)) = raw.split_last() else {
        return Err(FrameError::TooShort { len: 0 });
    };
    if last != FOOT {
        return Err(FrameError::Unterminated);
    }

    let capacity = max_payload + CRC_SIZE;
    let mut decoded = BytesMut::with_capacity(body.len().min(capacity));
    let mut bytes = body.iter().copied();
    while let Some(byte) = bytes.next() {
        let value = match byte {
            HEAD => continue,
            ESC => match bytes.next() {
                Some(next) => next ^ ESC_XOR,
                None => return Err(FrameError::DanglingEscape),
            },
            other => other,
        };
        if decoded.len() == capacity {
            return Err(FrameError::Overflow { capacity });
        }
        decoded.put_u8(value);
    }

    if decoded.len() < CRC_SIZE {
        return Err(FrameError::TooShort { len: decoded.len() });
    }

    let crc_at = decoded.len() - CRC_SIZE;
    let expected = u16::from_be_bytes([decoded[crc_at], decoded[crc_at + 1]]);
    let computed = crc16(&decoded[..crc_at]);
    if expected != computed {
        return Err(FrameError::CrcMismatch { expected, computed });
    }

    decoded.truncate(crc_at);
    Ok(decoded.freeze())
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Raw frame capacity of the receiver, markers included. Default: 256.
    pub max_frame_size: usize,
    /// Largest payload [`encode_frame`] accepts on the send path. Default:
    /// 125. Incoming frames are bounded by `max_frame_size` only.
    pub max_payload_size: usize,
}

impl FrameConfig {
    /// Largest payload a received frame of `max_frame_size` raw bytes can
    /// decode to.
    pub fn max_decoded_payload(&self) -> usize {
        self.max_frame_size.saturating_sub(2 + CRC_SIZE)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: RX_BUFFER_SIZE,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
