//! RPC_SID (MS-DTYP 2.4.2.3)

use std::fmt;

use rpc_ndr::{NdrDecode, Result, StructSchema, TypeDesc, Value};

/// Security identifier. `sub_authority` is conformant, so its count is
/// hoisted in front of the structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RpcSid {
    pub revision: u8,
    pub sub_authority_count: u8,
    /// 48-bit big-endian authority value
    pub identifier_authority: [u8; 6],
    pub sub_authority: Vec<u32>,
}

impl RpcSid {
    pub fn authority(&self) -> u64 {
        self.identifier_authority
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    }

    /// Relative identifier, the last sub-authority
    pub fn rid(&self) -> Option<u32> {
        self.sub_authority.last().copied()
    }
}

impl fmt::Display for RpcSid {
    /// `S-1-5-21-...` form; authorities of 2^32 and above print as hex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-", self.revision)?;
        let authority = self.authority();
        if authority >> 32 == 0 {
            write!(f, "{authority}")?;
        } else {
            write!(f, "0x{authority:012X}")?;
        }
        for sub in &self.sub_authority {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

impl NdrDecode for RpcSid {
    fn ndr_type() -> Result<TypeDesc> {
        cached_schema!(StructSchema::builder("RPC_SID")
            .field::<u8>("Revision")
            .field::<u8>("SubAuthorityCount")
            .field::<[u8; 6]>("IdentifierAuthority")
            .annotated::<Vec<u32>>("SubAuthority", "conformant")
            .build())
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let mut fields = value.into_struct("RPC_SID")?;
        Ok(Self {
            revision: fields.take("Revision")?,
            sub_authority_count: fields.take("SubAuthorityCount")?,
            identifier_authority: fields.take("IdentifierAuthority")?,
            sub_authority: fields.take("SubAuthority")?,
        })
    }
}
