//! Type serialization headers
//!
//! A top-level NDR buffer starts with two 8-byte headers (MS-RPCE 2.2.6):
//!
//! ```text
//! Common Header:  version(1) | drep(1) | header length(2) | filler(4)
//! Private Header: object buffer length(4) | filler(4)
//! ```
//!
//! The `drep` octet fixes the integer byte order for everything that follows,
//! including the header length field right after it. The alignment origin
//! is placed directly after the Private Header.

use bytes::Buf;
use tracing::debug;

use crate::{NdrContext, NdrError, NdrReader, Result};

/// Supported serialization version
pub const NDR_VERSION: u8 = 1;

/// Length of the Common Header in octets
pub const COMMON_HEADER_LENGTH: u16 = 8;

/// Filler value that terminates the Common Header
pub const HEADER_FILLER: u32 = 0xcccc_cccc;

/// Integer representation selected by the high nibble of `drep`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntRep {
    BigEndian = 0,
    LittleEndian = 1,
}

/// Common Header of a type serialization buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonHeader {
    pub version: u8,
    /// Data representation octet: bits 4-7 integer rep, bits 0-3 character rep
    pub drep: u8,
    pub header_length: u16,
    pub filler: u32,
}

impl CommonHeader {
    /// Decode and validate a Common Header, switching the reader to the
    /// byte order it declares.
    pub fn decode<B: Buf>(reader: &mut NdrReader<B>) -> Result<Self> {
        let version = reader.read_u8()?;
        if version != NDR_VERSION {
            return Err(NdrError::invalid_header(format!(
                "unsupported version {version}, expected {NDR_VERSION}"
            )));
        }

        let drep = reader.read_u8()?;
        let int_rep = int_rep(drep)?;
        reader.set_context(NdrContext::with_byte_order(int_rep == IntRep::LittleEndian));

        let header_length = reader.read_u16()?;
        if header_length != COMMON_HEADER_LENGTH {
            return Err(NdrError::invalid_header(format!(
                "common header length {header_length}, expected {COMMON_HEADER_LENGTH}"
            )));
        }

        let filler = reader.read_u32()?;
        if filler != HEADER_FILLER {
            return Err(NdrError::invalid_header(format!(
                "common header filler 0x{filler:08x}, expected 0x{HEADER_FILLER:08x}"
            )));
        }

        Ok(Self {
            version,
            drep,
            header_length,
            filler,
        })
    }

    pub fn int_rep(&self) -> IntRep {
        // validated during decode
        if self.drep >> 4 == 0 {
            IntRep::BigEndian
        } else {
            IntRep::LittleEndian
        }
    }

    pub fn is_little_endian(&self) -> bool {
        self.int_rep() == IntRep::LittleEndian
    }

    /// Byte-order context for the rest of the buffer
    pub fn context(&self) -> NdrContext {
        NdrContext::with_byte_order(self.is_little_endian())
    }
}

fn int_rep(drep: u8) -> Result<IntRep> {
    match drep >> 4 {
        0 => Ok(IntRep::BigEndian),
        1 => Ok(IntRep::LittleEndian),
        other => Err(NdrError::invalid_header(format!(
            "unknown integer representation {other} in drep 0x{drep:02x}"
        ))),
    }
}

/// Private Header of a type serialization buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateHeader {
    /// Length of the serialized object, padded to a multiple of 8
    pub object_buffer_length: u32,
    pub filler: u32,
}

impl PrivateHeader {
    pub fn decode<B: Buf>(reader: &mut NdrReader<B>) -> Result<Self> {
        let object_buffer_length = reader.read_u32()?;
        if object_buffer_length % 8 != 0 {
            return Err(NdrError::invalid_header(format!(
                "object buffer length {object_buffer_length} is not a multiple of 8"
            )));
        }
        let filler = reader.read_u32()?;
        Ok(Self {
            object_buffer_length,
            filler,
        })
    }
}

/// Both headers of a top-level buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Headers {
    pub common: CommonHeader,
    pub private: PrivateHeader,
}

impl Headers {
    /// Parse both headers and place the alignment origin after them.
    pub fn decode<B: Buf>(reader: &mut NdrReader<B>) -> Result<Self> {
        let common = CommonHeader::decode(reader)?;
        let private = PrivateHeader::decode(reader)?;
        reader.mark_origin();

        debug!(
            version = common.version,
            little_endian = common.is_little_endian(),
            object_buffer_length = private.object_buffer_length,
            "parsed NDR headers"
        );

        Ok(Self { common, private })
    }
}
