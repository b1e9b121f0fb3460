//! Helpers for building framed NDR buffers in unit tests

use bytes::{BufMut, Bytes, BytesMut};

use crate::header::HEADER_FILLER;

/// Frame a little-endian payload with Common and Private Headers. The
/// declared object length is the payload length rounded up to 8.
pub(crate) fn frame(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(16 + payload.len());
    buf.put_slice(&[0x01, 0x10]);
    buf.put_u16_le(8);
    buf.put_u32_le(HEADER_FILLER);
    buf.put_u32_le(object_length(payload));
    buf.put_u32_le(0);
    buf.put_slice(payload);
    buf.freeze()
}

/// Same as [`frame`] for a big-endian payload
pub(crate) fn frame_big_endian(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(16 + payload.len());
    buf.put_slice(&[0x01, 0x00]);
    buf.put_u16(8);
    buf.put_u32(HEADER_FILLER);
    buf.put_u32(object_length(payload));
    buf.put_u32(0);
    buf.put_slice(payload);
    buf.freeze()
}

/// Little-endian encoding of consecutive u32 values
pub(crate) fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn object_length(payload: &[u8]) -> u32 {
    ((payload.len() + 7) / 8 * 8) as u32
}
