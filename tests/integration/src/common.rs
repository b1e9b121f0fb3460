//! Helpers shared by the integration test targets

#![allow(dead_code)]

use bytes::{BufMut, Bytes, BytesMut};
use tracing_subscriber::EnvFilter;

/// PAC_LOGON_INFO buffer from the MS-PAC documentation sample
pub const KERB_VALIDATION_INFO_MS: &str = include_str!("../fixtures/kerb_validation_info_ms.hex");

/// PAC_LOGON_INFO buffer captured from a test domain
pub const KERB_VALIDATION_INFO: &str = include_str!("../fixtures/kerb_validation_info.hex");

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Parse a hex dump, ignoring whitespace.
pub fn hex(text: &str) -> Bytes {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    assert!(digits.len() % 2 == 0, "odd number of hex digits");

    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).expect("ascii hex");
            u8::from_str_radix(pair, 16).expect("hex digit")
        })
        .collect::<Vec<u8>>()
        .into()
}

/// Builder for little-endian NDR payloads framed with the type
/// serialization headers
#[derive(Debug, Default)]
pub struct Payload {
    buf: BytesMut,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.buf.put_u8(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.buf.put_u16_le(value);
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.buf.put_u32_le(value);
        self
    }

    pub fn u32s(mut self, values: &[u32]) -> Self {
        for value in values {
            self.buf.put_u32_le(*value);
        }
        self
    }

    /// Zero bytes up to the next multiple of `alignment`
    pub fn pad(mut self, alignment: usize) -> Self {
        while self.buf.len() % alignment != 0 {
            self.buf.put_u8(0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Prepend the Common and Private Headers.
    pub fn frame(self) -> Bytes {
        let object_length = (self.buf.len() + 7) / 8 * 8;
        let mut out = BytesMut::with_capacity(16 + self.buf.len());
        out.put_slice(&[0x01, 0x10]);
        out.put_u16_le(8);
        out.put_u32_le(rpc_ndr::HEADER_FILLER);
        out.put_u32_le(object_length as u32);
        out.put_u32_le(0);
        out.put_slice(&self.buf);
        out.freeze()
    }
}
