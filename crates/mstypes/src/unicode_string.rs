//! RPC_UNICODE_STRING (MS-DTYP 2.3.10)

use std::fmt;

use rpc_ndr::{NdrDecode, NdrError, Result, StructSchema, TypeDesc, Value};

/// Counted UTF-16 string. The buffer is a deferred conformant varying array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcUnicodeString {
    /// Length of the text in bytes
    pub length: u16,
    /// Size of the buffer in bytes
    pub maximum_length: u16,
    pub buffer: Vec<u16>,
}

impl RpcUnicodeString {
    /// Decoded text, limited to `length` bytes.
    pub fn value(&self) -> Result<String> {
        String::from_utf16(self.units()).map_err(|e| NdrError::InvalidString(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.units().is_empty()
    }

    fn units(&self) -> &[u16] {
        let count = usize::from(self.length / 2).min(self.buffer.len());
        &self.buffer[..count]
    }
}

impl fmt::Display for RpcUnicodeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf16_lossy(self.units()))
    }
}

impl NdrDecode for RpcUnicodeString {
    fn ndr_type() -> Result<TypeDesc> {
        cached_schema!(StructSchema::builder("RPC_UNICODE_STRING")
            .field::<u16>("Length")
            .field::<u16>("MaximumLength")
            .annotated::<Vec<u16>>("Buffer", "pointer,conformant,varying")
            .build())
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let mut fields = value.into_struct("RPC_UNICODE_STRING")?;
        Ok(Self {
            length: fields.take("Length")?,
            maximum_length: fields.take("MaximumLength")?,
            buffer: fields.take("Buffer")?,
        })
    }
}
