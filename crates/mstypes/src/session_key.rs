//! USER_SESSION_KEY (MS-PAC 2.2.3)

use rpc_ndr::{NdrDecode, Result, StructSchema, TypeDesc, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CypherBlock {
    pub data: [u8; 8],
}

impl NdrDecode for CypherBlock {
    fn ndr_type() -> Result<TypeDesc> {
        cached_schema!(StructSchema::builder("CYPHER_BLOCK")
            .field::<[u8; 8]>("data")
            .build())
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let mut fields = value.into_struct("CYPHER_BLOCK")?;
        Ok(Self {
            data: fields.take("data")?,
        })
    }
}

/// Session key, two cypher blocks; all zero in a PAC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserSessionKey {
    pub cypher_block: [CypherBlock; 2],
}

impl UserSessionKey {
    pub fn is_zero(&self) -> bool {
        self.cypher_block.iter().all(|block| block.data == [0; 8])
    }
}

impl NdrDecode for UserSessionKey {
    fn ndr_type() -> Result<TypeDesc> {
        cached_schema!(StructSchema::builder("USER_SESSION_KEY")
            .field::<[CypherBlock; 2]>("data")
            .build())
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let mut fields = value.into_struct("USER_SESSION_KEY")?;
        Ok(Self {
            cypher_block: fields.take("data")?,
        })
    }
}
