//! Group membership records (MS-PAC 2.2.2, 2.2.1)

use rpc_ndr::{NdrDecode, Result, StructSchema, TypeDesc, Value};

use crate::RpcSid;

/// GROUP_MEMBERSHIP: relative ID within the logon domain plus attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GroupMembership {
    pub relative_id: u32,
    pub attributes: u32,
}

impl NdrDecode for GroupMembership {
    fn ndr_type() -> Result<TypeDesc> {
        cached_schema!(StructSchema::builder("GROUP_MEMBERSHIP")
            .field::<u32>("RelativeId")
            .field::<u32>("Attributes")
            .build())
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let mut fields = value.into_struct("GROUP_MEMBERSHIP")?;
        Ok(Self {
            relative_id: fields.take("RelativeId")?,
            attributes: fields.take("Attributes")?,
        })
    }
}

/// KERB_SID_AND_ATTRIBUTES: a full SID (deferred) plus attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KerbSidAndAttributes {
    pub sid: Option<RpcSid>,
    pub attributes: u32,
}

impl NdrDecode for KerbSidAndAttributes {
    fn ndr_type() -> Result<TypeDesc> {
        cached_schema!(StructSchema::builder("KERB_SID_AND_ATTRIBUTES")
            .annotated::<Option<RpcSid>>("Sid", "pointer")
            .field::<u32>("Attributes")
            .build())
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let mut fields = value.into_struct("KERB_SID_AND_ATTRIBUTES")?;
        Ok(Self {
            sid: fields.take("Sid")?,
            attributes: fields.take("Attributes")?,
        })
    }
}
