//! Windows data types carried in NDR buffers
//!
//! Schemas for the MS-DTYP and MS-PAC structures found in the Kerberos PAC
//! logon information buffer, decoded with `rpc-ndr`, plus the conversions of
//! their raw fields into domain values (timestamps, SID strings, UTF-16
//! text).

/// Cache a structure schema for the lifetime of the process.
macro_rules! cached_schema {
    ($build:expr) => {{
        static SCHEMA: std::sync::OnceLock<
            rpc_ndr::Result<std::sync::Arc<rpc_ndr::StructSchema>>,
        > = std::sync::OnceLock::new();
        SCHEMA
            .get_or_init(|| $build)
            .clone()
            .map(rpc_ndr::TypeDesc::Struct)
    }};
}

mod filetime;
mod groups;
mod kerb_validation_info;
mod session_key;
mod sid;
mod unicode_string;

pub use filetime::{FileTime, UNIX_EPOCH_OFFSET};
pub use groups::{GroupMembership, KerbSidAndAttributes};
pub use kerb_validation_info::KerbValidationInfo;
pub use session_key::{CypherBlock, UserSessionKey};
pub use sid::RpcSid;
pub use unicode_string::RpcUnicodeString;
