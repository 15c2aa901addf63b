use rtc_access::{
    crc32, inspect_lenient, AccessConfig, AccessTokenService, Identity, IssueOptions, Role,
    SdkError, TokenError, TokenMode, JOIN_CHANNEL,
};
use std::error::Error;

const APP_ID: &str = "4a410e05b4554ec1a81555f44bc3228e";
const CERT: &str = "02f9818234cb497d8ec7770cec6ffb82";
const CHANNEL: &str = "finmentor-channel";

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn secure_service() -> AccessTokenService {
    AccessTokenService::new(AccessConfig::new(APP_ID, Some(CERT))).unwrap()
}

#[test]
fn test_end_to_end_scenario() -> Result<(), Box<dyn Error>> {
    let service = secure_service();
    let before = now();
    let inspected = service.issue_and_inspect(CHANNEL, "12345")?;
    let after = now();

    assert_eq!(inspected.issued.mode(), TokenMode::Secure);
    assert_eq!(inspected.issued.uid, "12345");
    let token = inspected.issued.token.as_deref().expect("secure mode");
    assert!(token.starts_with("006"));

    let view = inspected.view.expect("view for secure token");
    assert_eq!(view.byte_length, 56 + 8);
    assert_eq!(view.app_id_hex, APP_ID);
    assert_eq!(view.channel_crc, Some(crc32(CHANNEL.as_bytes())));
    assert_eq!(view.uid_crc, Some(crc32(b"12345")));
    assert_eq!(view.message.count, 1);
    assert_eq!(view.message.items[0].privilege, JOIN_CHANNEL);

    let expire_ts = i64::from(view.message.items[0].expire_ts);
    assert!(expire_ts >= before + 3600);
    assert!(expire_ts <= after + 3600);
    assert_eq!(
        inspected.issued.expires_at.map(|t| t.timestamp()),
        Some(expire_ts)
    );
    Ok(())
}

#[test]
fn test_issue_recovers_inputs_for_text_identity() -> Result<(), Box<dyn Error>> {
    let service = secure_service();
    let options = IssueOptions {
        role: Role::Subscriber,
        expire_seconds: 60,
    };
    let before = now();
    let issued = service.issue_with("lobby", &Identity::Text("alice".to_string()), options)?;
    let view = service.inspect(issued.token.as_deref().unwrap())?;

    assert_eq!(view.uid_crc, Some(crc32(b"alice")));
    assert_eq!(view.channel_crc, Some(crc32(b"lobby")));
    let expire_ts = i64::from(view.message.items[0].expire_ts);
    assert!((expire_ts - (before + 60)).abs() <= 2);
    Ok(())
}

#[test]
fn test_two_issues_differ_only_in_signature() -> Result<(), Box<dyn Error>> {
    let service = secure_service();
    let a = service.issue_and_inspect(CHANNEL, "12345")?.view.unwrap();
    let b = service.issue_and_inspect(CHANNEL, "12345")?.view.unwrap();

    assert_ne!(a.signature_hex, b.signature_hex);
    assert_eq!(a.app_id_hex, b.app_id_hex);
    assert_eq!(a.channel_crc, b.channel_crc);
    assert_eq!(a.uid_crc, b.uid_crc);
    assert_eq!(a.message.count, b.message.count);
    assert_eq!(a.message.items[0].privilege, b.message.items[0].privilege);
    Ok(())
}

#[test]
fn test_tokenless_mode() -> Result<(), Box<dyn Error>> {
    let service = AccessTokenService::new(AccessConfig::new(APP_ID, None))?;
    assert_eq!(service.token_mode(), TokenMode::Tokenless);

    let inspected = service.issue_and_inspect(CHANNEL, "12345")?;
    assert_eq!(inspected.issued.token, None);
    assert_eq!(inspected.issued.mode(), TokenMode::Tokenless);
    assert_eq!(inspected.issued.expires_at, None);
    assert!(inspected.view.is_none());

    let rtm = service.issue_rtm("alice")?;
    assert_eq!(rtm.token, None);
    Ok(())
}

#[test]
fn test_rtm_token() -> Result<(), Box<dyn Error>> {
    let service = secure_service();
    let issued = service.issue_rtm("alice@example.com")?;
    assert_eq!(issued.channel, "");

    let view = service.inspect(issued.token.as_deref().unwrap())?;
    assert_eq!(view.channel_crc, Some(0));
    assert_eq!(view.uid_crc, Some(crc32(b"alice@example.com")));
    Ok(())
}

#[test]
fn test_rtm_numeric_account_is_normalized() -> Result<(), Box<dyn Error>> {
    let service = secure_service();
    let issued = service.issue_rtm("007")?;
    assert_eq!(issued.uid, "7");

    let view = service.inspect(issued.token.as_deref().unwrap())?;
    assert_eq!(view.uid_crc, Some(crc32(b"7")));

    match service.issue_rtm("4294967296") {
        Err(SdkError::Token(TokenError::IdentityOverflow(_))) => {}
        other => panic!("Expected IdentityOverflow, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_numeric_identity_uses_text_form_for_checksum() -> Result<(), Box<dyn Error>> {
    let service = secure_service();
    let issued = service.issue(CHANNEL, "007")?;
    assert_eq!(issued.uid, "7");

    let view = service.inspect(issued.token.as_deref().unwrap())?;
    assert_eq!(view.uid_crc, Some(crc32(b"7")));
    Ok(())
}

#[test]
fn test_identity_overflow_is_an_error() {
    let service = secure_service();
    match service.issue(CHANNEL, "4294967296") {
        Err(SdkError::Token(TokenError::IdentityOverflow(_))) => {}
        other => panic!("Expected IdentityOverflow, got {other:?}"),
    }
}

#[test]
fn test_inspect_malformed_token() {
    let service = secure_service();
    match service.inspect("not-base64!!") {
        Err(SdkError::Token(TokenError::MalformedToken(_))) => {}
        other => panic!("Expected MalformedToken, got {other:?}"),
    }

    let view = inspect_lenient("006not-base64!!");
    assert_eq!(view.token_version, "006");
    assert!(view.error.is_some());
}

#[test]
fn test_view_json_matches_inspection_tool_output() -> Result<(), Box<dyn Error>> {
    let service = secure_service();
    let issued = service.issue(CHANNEL, "12345")?;
    let view = service.inspect(issued.token.as_deref().unwrap())?;
    let json = serde_json::to_value(&view)?;

    assert_eq!(json["tokenVersion"], "006");
    assert_eq!(json["appIdHex"], APP_ID);
    assert_eq!(json["appIdAscii"].as_str().map(str::len), Some(16));
    assert_eq!(json["message"]["count"], 1);
    assert_eq!(json["message"]["items"][0]["privilege"], 1);
    assert!(json["message"]["items"][0]["expireTs"].is_u64());
    assert_eq!(json["rawHex"].as_str().map(str::len), Some(128));
    Ok(())
}

#[test]
fn test_builder_rejects_invalid_app_id() {
    match AccessTokenService::builder().app_id("xyz").build() {
        Err(SdkError::Config(_)) => {}
        other => panic!("Expected configuration error, got {other:?}"),
    }
}
