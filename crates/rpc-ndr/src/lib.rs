//! NDR (Network Data Representation) decoding engine
//!
//! This crate decodes DCE/MS-RPC marshalled buffers, such as the type
//! serialization buffers carried in a Kerberos PAC, into typed values
//! described by a static schema.
//!
//! # NDR Wire Format
//!
//! - A top-level buffer starts with a Common Header and a Private Header that
//!   fix the byte order and the alignment origin
//! - Primitives align to their natural size (1, 2, 4, or 8 bytes) relative
//!   to that origin
//! - Structures align to their widest member; conformant and varying
//!   arrays to at least 4 bytes for their headers
//! - Conformant array sizes are hoisted to the start of the structure that
//!   embeds them; varying windows precede the array data
//! - Embedded pointers are 4-byte referent IDs; the pointees follow the
//!   immediate data, breadth-first
//!
//! # Example
//!
//! ```
//! use rpc_ndr::{Decoder, NdrDecode, Result, StructSchema, TypeDesc, Value};
//!
//! struct Counted {
//!     tag: u16,
//!     items: Vec<u32>,
//! }
//!
//! impl NdrDecode for Counted {
//!     fn ndr_type() -> Result<TypeDesc> {
//!         let schema = StructSchema::builder("Counted")
//!             .field::<u16>("Tag")
//!             .annotated::<Vec<u32>>("Items", "conformant")
//!             .build()?;
//!         Ok(TypeDesc::Struct(schema))
//!     }
//!
//!     fn from_ndr(value: Value) -> Result<Self> {
//!         let mut fields = value.into_struct("Counted")?;
//!         Ok(Self {
//!             tag: fields.take("Tag")?,
//!             items: fields.take("Items")?,
//!         })
//!     }
//! }
//!
//! let bytes: &[u8] = &[
//!     0x01, 0x10, 0x08, 0x00, 0xcc, 0xcc, 0xcc, 0xcc, // common header
//!     0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // private header
//!     0x02, 0x00, 0x00, 0x00, // max_count
//!     0x07, 0x00, 0x00, 0x00, // tag + padding
//!     0x0a, 0x00, 0x00, 0x00, 0x0b, 0x00, 0x00, 0x00,
//! ];
//! let counted: Counted = Decoder::new(bytes)?.decode()?;
//! assert_eq!(counted.tag, 7);
//! assert_eq!(counted.items, vec![10, 11]);
//! # Ok::<(), rpc_ndr::NdrError>(())
//! ```

mod arrays;
mod context;
mod decode;
mod error;
mod header;
mod options;
mod pointers;
mod primitives;
mod reader;
mod schema;
mod value;

#[cfg(test)]
mod test_utils;

pub use arrays::VaryingRecord;
pub use context::NdrContext;
pub use decode::{Decoder, NdrDecode};
pub use error::{NdrError, Result};
pub use header::{
    CommonHeader, Headers, IntRep, PrivateHeader, COMMON_HEADER_LENGTH, HEADER_FILLER,
    NDR_VERSION,
};
pub use options::{DecodeOptions, DeferralOrder, ReferentAliasing, DEFAULT_MAX_ARRAY_ELEMENTS};
pub use primitives::Primitive;
pub use reader::NdrReader;
pub use schema::{
    ArrayKind, ArrayLayout, Dimension, FieldAttrs, FieldSchema, Layout, StructSchema,
    StructSchemaBuilder, TypeDesc,
};
pub use value::{Pointer, StructValue, Value};

/// Re-export bytes for convenience
pub use bytes::{Buf, Bytes};

/// Decode a `T` from a framed buffer with default options.
pub fn decode<T: NdrDecode, B: Buf>(buf: B) -> Result<T> {
    decode_with_options(buf, DecodeOptions::default())
}

/// Decode a `T` from a framed buffer.
pub fn decode_with_options<T: NdrDecode, B: Buf>(buf: B, options: DecodeOptions) -> Result<T> {
    Decoder::with_options(buf, options)?.decode()
}
