//! PAC logon information tests
//!
//! Both fixtures are complete PAC_LOGON_INFO buffers: type serialization
//! headers, the top-level referent and a KERB_VALIDATION_INFO with deferred
//! strings, SIDs and group arrays.

mod common;

use common::{hex, init_tracing, KERB_VALIDATION_INFO, KERB_VALIDATION_INFO_MS};
use mstypes::{GroupMembership, KerbValidationInfo};
use rpc_ndr::{DecodeOptions, Decoder, NdrError};

fn decode(fixture: &str) -> KerbValidationInfo {
    init_tracing();
    KerbValidationInfo::decode(hex(fixture)).expect("valid PAC buffer")
}

#[test]
fn test_ms_sample_names() {
    let info = decode(KERB_VALIDATION_INFO_MS);

    assert_eq!(info.effective_name.value().unwrap(), "lzhu");
    assert_eq!(info.full_name.value().unwrap(), "Liqiang(Larry) Zhu");
    assert_eq!(info.logon_script.value().unwrap(), "ntds2.bat");
    assert!(info.profile_path.is_empty());
    assert!(info.home_directory.is_empty());
    assert!(info.home_directory_drive.is_empty());
    assert_eq!(info.logon_server.value().unwrap(), "NTDEV-DC-05");
    assert_eq!(info.logon_domain_name.value().unwrap(), "NTDEV");
}

#[test]
fn test_ms_sample_times() {
    let info = decode(KERB_VALIDATION_INFO_MS);

    assert_eq!(info.logon_time.unix_nanos(), 1_146_188_570_925_640_100);
    assert_eq!(info.password_last_set.unix_nanos(), 1_142_678_694_837_147_900);
    assert!(info.logoff_time.is_never());
    assert!(info.kick_off_time.is_never());
    assert!(info.logon_time.to_system_time().is_some());
    assert_eq!(info.last_successful_i_logon.as_u64(), 0);
}

#[test]
fn test_ms_sample_groups() {
    let info = decode(KERB_VALIDATION_INFO_MS);

    assert_eq!(info.logon_count, 4180);
    assert_eq!(info.bad_password_count, 0);
    assert_eq!(info.user_id, 2_914_711);
    assert_eq!(info.primary_group_id, 513);
    assert_eq!(info.group_count, 26);
    assert_eq!(info.group_ids.len(), 26);
    assert_eq!(
        info.group_ids[0],
        GroupMembership {
            relative_id: 3_392_609,
            attributes: 7,
        }
    );
    assert_eq!(info.group_ids[1].relative_id, 2_999_049);
    assert_eq!(info.group_ids[3].relative_id, 513);
    assert!(info.group_ids.iter().all(|g| g.attributes == 7));
}

#[test]
fn test_ms_sample_sids() {
    let info = decode(KERB_VALIDATION_INFO_MS);

    let domain = info.logon_domain_id.as_ref().expect("logon domain SID");
    assert_eq!(domain.to_string(), "S-1-5-21-397955417-626881126-188441444");
    assert_eq!(domain.sub_authority_count, 4);

    assert_eq!(info.user_flags, 32);
    assert_eq!(info.user_account_control, 16);
    assert_eq!(info.sid_count, 13);
    assert_eq!(info.extra_sids.len(), 13);

    let first = &info.extra_sids[0];
    assert_eq!(
        first.sid.as_ref().unwrap().to_string(),
        "S-1-5-21-773533881-1816936887-355810188-513"
    );
    assert_eq!(first.attributes, 7);

    let second = &info.extra_sids[1];
    assert_eq!(
        second.sid.as_ref().unwrap().to_string(),
        "S-1-5-21-397955417-626881126-188441444-3101812"
    );
    assert_eq!(second.attributes, 536_870_919);

    assert!(info.resource_group_domain_sid.is_none());
    assert_eq!(info.resource_group_count, 0);
    assert!(info.resource_group_ids.is_empty());
    assert!(info.user_session_key.is_zero());
}

#[test]
fn test_domain_sample() {
    let info = decode(KERB_VALIDATION_INFO);

    assert_eq!(info.effective_name.value().unwrap(), "testuser1");
    assert_eq!(info.full_name.value().unwrap(), "Test1 User1");
    assert!(info.logon_script.is_empty());
    assert!(info.profile_path.is_empty());
    assert_eq!(info.logon_server.value().unwrap(), "ADDC");
    assert_eq!(info.logon_domain_name.value().unwrap(), "TEST");

    assert_eq!(info.logon_time.unix_nanos(), 1_494_085_991_825_766_900);
    assert_eq!(info.password_last_set.unix_nanos(), 1_494_055_388_968_750_000);
    assert_eq!(info.password_can_change.unix_nanos(), 1_494_141_788_968_750_000);
    assert!(info.password_must_change.is_never());

    assert_eq!(info.logon_count, 216);
    assert_eq!(info.user_id, 1105);
    assert_eq!(info.primary_group_id, 513);
    let rids: Vec<u32> = info.group_ids.iter().map(|g| g.relative_id).collect();
    assert_eq!(rids, vec![513, 1108, 1109, 1115, 1116]);
    assert_eq!(info.user_flags, 32);
    assert_eq!(info.user_account_control, 528);
    assert!(info.user_session_key.is_zero());
}

#[test]
fn test_domain_sample_extra_sids() {
    let info = decode(KERB_VALIDATION_INFO);

    let domain = info.logon_domain_id.as_ref().unwrap();
    assert_eq!(domain.to_string(), "S-1-5-21-3167651404-3865080224-2280184895");

    let sids: Vec<(String, u32)> = info
        .extra_sids
        .iter()
        .map(|e| (e.sid.as_ref().unwrap().to_string(), e.attributes))
        .collect();
    assert_eq!(
        sids,
        vec![
            (
                "S-1-5-21-3167651404-3865080224-2280184895-1114".to_string(),
                536_870_919
            ),
            (
                "S-1-5-21-3167651404-3865080224-2280184895-1111".to_string(),
                536_870_919
            ),
        ]
    );
    assert_eq!(info.extra_sids[0].sid.as_ref().unwrap().rid(), Some(1114));
    assert!(info.resource_group_domain_sid.is_none());
}

#[test]
fn test_decoder_consumes_all_but_trailing_padding() {
    init_tracing();
    for (fixture, total) in [(KERB_VALIDATION_INFO_MS, 1200), (KERB_VALIDATION_INFO, 552)] {
        let bytes = hex(fixture);
        assert_eq!(bytes.len(), total);

        let mut dec = Decoder::with_options(bytes, DecodeOptions::type_serialization()).unwrap();
        assert!(dec.headers().common.is_little_endian());
        let info: KerbValidationInfo = dec.decode().unwrap();
        assert!(info.user_id > 0);
        assert_eq!(dec.remaining(), 4);
    }
}

#[test]
fn test_decode_is_deterministic() {
    let first = decode(KERB_VALIDATION_INFO_MS);
    let second = decode(KERB_VALIDATION_INFO_MS);
    assert_eq!(first, second);
}

#[test]
fn test_truncated_fixture_reports_path() {
    init_tracing();
    let bytes = hex(KERB_VALIDATION_INFO);
    let err = KerbValidationInfo::decode(bytes.slice(..bytes.len() - 40)).unwrap_err();
    assert!(err.path().is_some());
    assert!(matches!(err.root_cause(), NdrError::EndOfStream { .. }));
}

#[test]
fn test_corrupt_header_rejected() {
    let mut bytes = hex(KERB_VALIDATION_INFO).to_vec();
    bytes[4] = 0;
    let err = KerbValidationInfo::decode(&bytes[..]).unwrap_err();
    assert!(matches!(err, NdrError::InvalidHeader(_)));
}
