//! KERB_VALIDATION_INFO (MS-PAC 2.5), the PAC logon information buffer

use bytes::Buf;
use rpc_ndr::{DecodeOptions, NdrDecode, Result, StructSchema, TypeDesc, Value};
use tracing::debug;

use crate::{
    FileTime, GroupMembership, KerbSidAndAttributes, RpcSid, RpcUnicodeString, UserSessionKey,
};

/// User logon information from a PAC_LOGON_INFO buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KerbValidationInfo {
    pub logon_time: FileTime,
    pub logoff_time: FileTime,
    pub kick_off_time: FileTime,
    pub password_last_set: FileTime,
    pub password_can_change: FileTime,
    pub password_must_change: FileTime,
    pub effective_name: RpcUnicodeString,
    pub full_name: RpcUnicodeString,
    pub logon_script: RpcUnicodeString,
    pub profile_path: RpcUnicodeString,
    pub home_directory: RpcUnicodeString,
    pub home_directory_drive: RpcUnicodeString,
    pub logon_count: u16,
    pub bad_password_count: u16,
    pub user_id: u32,
    pub primary_group_id: u32,
    pub group_count: u32,
    pub group_ids: Vec<GroupMembership>,
    pub user_flags: u32,
    pub user_session_key: UserSessionKey,
    pub logon_server: RpcUnicodeString,
    pub logon_domain_name: RpcUnicodeString,
    pub logon_domain_id: Option<RpcSid>,
    pub reserved1: [u32; 2],
    pub user_account_control: u32,
    pub sub_auth_status: u32,
    pub last_successful_i_logon: FileTime,
    pub last_failed_i_logon: FileTime,
    pub failed_i_logon_count: u32,
    pub reserved3: u32,
    pub sid_count: u32,
    pub extra_sids: Vec<KerbSidAndAttributes>,
    pub resource_group_domain_sid: Option<RpcSid>,
    pub resource_group_count: u32,
    pub resource_group_ids: Vec<GroupMembership>,
}

impl KerbValidationInfo {
    /// Decode a complete PAC_LOGON_INFO buffer (type serialization headers,
    /// top-level referent and the structure).
    pub fn decode<B: Buf>(buf: B) -> Result<Self> {
        let info: Self = rpc_ndr::decode_with_options(buf, DecodeOptions::type_serialization())?;
        debug!(
            user_id = info.user_id,
            groups = info.group_ids.len(),
            extra_sids = info.extra_sids.len(),
            "decoded logon information"
        );
        Ok(info)
    }
}

impl NdrDecode for KerbValidationInfo {
    fn ndr_type() -> Result<TypeDesc> {
        cached_schema!(StructSchema::builder("KERB_VALIDATION_INFO")
            .field::<FileTime>("LogonTime")
            .field::<FileTime>("LogoffTime")
            .field::<FileTime>("KickOffTime")
            .field::<FileTime>("PasswordLastSet")
            .field::<FileTime>("PasswordCanChange")
            .field::<FileTime>("PasswordMustChange")
            .field::<RpcUnicodeString>("EffectiveName")
            .field::<RpcUnicodeString>("FullName")
            .field::<RpcUnicodeString>("LogonScript")
            .field::<RpcUnicodeString>("ProfilePath")
            .field::<RpcUnicodeString>("HomeDirectory")
            .field::<RpcUnicodeString>("HomeDirectoryDrive")
            .field::<u16>("LogonCount")
            .field::<u16>("BadPasswordCount")
            .field::<u32>("UserId")
            .field::<u32>("PrimaryGroupId")
            .field::<u32>("GroupCount")
            .annotated::<Vec<GroupMembership>>("GroupIds", "pointer,conformant")
            .field::<u32>("UserFlags")
            .field::<UserSessionKey>("UserSessionKey")
            .field::<RpcUnicodeString>("LogonServer")
            .field::<RpcUnicodeString>("LogonDomainName")
            .annotated::<Option<RpcSid>>("LogonDomainId", "pointer")
            .field::<[u32; 2]>("Reserved1")
            .field::<u32>("UserAccountControl")
            .field::<u32>("SubAuthStatus")
            .field::<FileTime>("LastSuccessfulILogon")
            .field::<FileTime>("LastFailedILogon")
            .field::<u32>("FailedILogonCount")
            .field::<u32>("Reserved3")
            .field::<u32>("SidCount")
            .annotated::<Vec<KerbSidAndAttributes>>("ExtraSids", "pointer,conformant")
            .annotated::<Option<RpcSid>>("ResourceGroupDomainSid", "pointer")
            .field::<u32>("ResourceGroupCount")
            .annotated::<Vec<GroupMembership>>("ResourceGroupIds", "pointer,conformant")
            .build())
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let mut f = value.into_struct("KERB_VALIDATION_INFO")?;
        Ok(Self {
            logon_time: f.take("LogonTime")?,
            logoff_time: f.take("LogoffTime")?,
            kick_off_time: f.take("KickOffTime")?,
            password_last_set: f.take("PasswordLastSet")?,
            password_can_change: f.take("PasswordCanChange")?,
            password_must_change: f.take("PasswordMustChange")?,
            effective_name: f.take("EffectiveName")?,
            full_name: f.take("FullName")?,
            logon_script: f.take("LogonScript")?,
            profile_path: f.take("ProfilePath")?,
            home_directory: f.take("HomeDirectory")?,
            home_directory_drive: f.take("HomeDirectoryDrive")?,
            logon_count: f.take("LogonCount")?,
            bad_password_count: f.take("BadPasswordCount")?,
            user_id: f.take("UserId")?,
            primary_group_id: f.take("PrimaryGroupId")?,
            group_count: f.take("GroupCount")?,
            group_ids: f.take("GroupIds")?,
            user_flags: f.take("UserFlags")?,
            user_session_key: f.take("UserSessionKey")?,
            logon_server: f.take("LogonServer")?,
            logon_domain_name: f.take("LogonDomainName")?,
            logon_domain_id: f.take("LogonDomainId")?,
            reserved1: f.take("Reserved1")?,
            user_account_control: f.take("UserAccountControl")?,
            sub_auth_status: f.take("SubAuthStatus")?,
            last_successful_i_logon: f.take("LastSuccessfulILogon")?,
            last_failed_i_logon: f.take("LastFailedILogon")?,
            failed_i_logon_count: f.take("FailedILogonCount")?,
            reserved3: f.take("Reserved3")?,
            sid_count: f.take("SidCount")?,
            extra_sids: f.take("ExtraSids")?,
            resource_group_domain_sid: f.take("ResourceGroupDomainSid")?,
            resource_group_count: f.take("ResourceGroupCount")?,
            resource_group_ids: f.take("ResourceGroupIds")?,
        })
    }
}
