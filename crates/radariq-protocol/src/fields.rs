//! Fixed-offset little-endian field access.
//!
//! Signed fields are bit-reinterpreted from their unsigned pattern.

use bytes::Buf;

pub(crate) fn u8_at(payload: &[u8], offset: usize) -> Option<u8> {
    payload.get(offset).copied()
}

pub(crate) fn i8_at(payload: &[u8], offset: usize) -> Option<i8> {
    u8_at(payload, offset).map(|byte| i8::from_le_bytes([byte]))
}

pub(crate) fn u16_at(payload: &[u8], offset: usize) -> Option<u16> {
    let mut field = payload.get(offset..offset.checked_add(2)?)?;
    Some(field.get_u16_le())
}

pub(crate) fn i16_at(payload: &[u8], offset: usize) -> Option<i16> {
    let mut field = payload.get(offset..offset.checked_add(2)?)?;
    Some(field.get_i16_le())
}

pub(crate) fn u32_at(payload: &[u8], offset: usize) -> Option<u32> {
    let mut field = payload.get(offset..offset.checked_add(4)?)?;
    Some(field.get_u32_le())
}

/// `len` bytes starting at `offset`. Read fields off it with `Buf`.
pub(crate) fn block_at(payload: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    payload.get(offset..offset.checked_add(len)?)
}

/// NUL-terminated text of at most `max` bytes starting at `offset`.
///
/// A missing terminator ends the text at `max` or at the end of the payload.
pub(crate) fn c_str_at(payload: &[u8], offset: usize, max: usize) -> String {
    let tail = payload.get(offset..).unwrap_or_default();
    let tail = &tail[..tail.len().min(max)];
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
    String::from_utf8_lossy(&tail[..end]).into_owned()
}
