use rtc_access::{AccessConfig, AccessConfigBuilder, ConfigError, Role, DEFAULT_EXPIRE_SECONDS};
use std::env;
use std::fs;

const APP_ID: &str = "4a410e05b4554ec1a81555f44bc3228e";
const CERT: &str = "02f9818234cb497d8ec7770cec6ffb82";

#[test]
fn test_config_new() {
    let config = AccessConfig::new(APP_ID, Some(CERT));

    assert_eq!(config.app_id, APP_ID);
    assert_eq!(config.app_certificate.as_deref(), Some(CERT));
    assert_eq!(config.default_expire_seconds, DEFAULT_EXPIRE_SECONDS);
    assert_eq!(config.default_role, Role::Publisher);
    assert!(!config.is_tokenless());
}

#[test]
fn test_config_validation() {
    assert!(AccessConfig::new(APP_ID, Some(CERT)).validate().is_ok());

    // Hyphenated app ids are accepted
    assert!(AccessConfig::new("4a410e05-b455-4ec1-a815-55f44bc3228e", None)
        .validate()
        .is_ok());

    // Missing app id
    match AccessConfig::new("", Some(CERT)).validate() {
        Err(ConfigError::MissingAppId) => {}
        _ => panic!("Expected MissingAppId error"),
    }

    // App id of the wrong length
    match AccessConfig::new("4a410e05", Some(CERT)).validate() {
        Err(ConfigError::InvalidAppId(_)) => {}
        _ => panic!("Expected InvalidAppId error"),
    }

    // App id that is not hex
    match AccessConfig::new("zz410e05b4554ec1a81555f44bc3228e", Some(CERT)).validate() {
        Err(ConfigError::InvalidAppId(_)) => {}
        _ => panic!("Expected InvalidAppId error"),
    }

    // Zero lifetime
    let mut config = AccessConfig::new(APP_ID, Some(CERT));
    config.default_expire_seconds = 0;
    match config.validate() {
        Err(ConfigError::InvalidExpiry(_)) => {}
        _ => panic!("Expected InvalidExpiry error"),
    }
}

#[test]
fn test_config_builder() {
    let config = AccessConfigBuilder::new()
        .app_id(APP_ID)
        .app_certificate(CERT)
        .default_expire_seconds(600)
        .default_role(Role::Subscriber)
        .build()
        .unwrap();

    assert_eq!(config.default_expire_seconds, 600);
    assert_eq!(config.default_role, Role::Subscriber);

    let tokenless = config.to_builder().tokenless().build().unwrap();
    assert!(tokenless.is_tokenless());
    assert_eq!(tokenless.default_expire_seconds, 600);

    match AccessConfigBuilder::new().app_certificate(CERT).build() {
        Err(ConfigError::MissingAppId) => {}
        _ => panic!("Expected MissingAppId error"),
    }
}

#[test]
fn test_config_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rtc.json");
    fs::write(
        &path,
        format!(r#"{{"app_id": "{APP_ID}", "app_certificate": "{CERT}", "default_role": "subscriber"}}"#),
    )
    .unwrap();

    let config = AccessConfig::from_file(&path).unwrap();
    assert_eq!(config.app_id, APP_ID);
    assert_eq!(config.app_certificate.as_deref(), Some(CERT));
    assert_eq!(config.default_expire_seconds, DEFAULT_EXPIRE_SECONDS);
    assert_eq!(config.default_role, Role::Subscriber);
}

#[test]
fn test_config_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rtc.toml");
    fs::write(
        &path,
        format!("app_id = \"{APP_ID}\"\ndefault_expire_seconds = 120\n"),
    )
    .unwrap();

    let config = AccessConfig::from_toml(&path).unwrap();
    assert_eq!(config.default_expire_seconds, 120);
    assert!(config.is_tokenless());
}

#[test]
fn test_config_file_errors() {
    let dir = tempfile::tempdir().unwrap();

    match AccessConfig::from_file(dir.path().join("missing.json")) {
        Err(ConfigError::IOError(_)) => {}
        _ => panic!("Expected IOError"),
    }

    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    match AccessConfig::from_file(&path) {
        Err(ConfigError::ParseError(_)) => {}
        _ => panic!("Expected ParseError"),
    }

    let path = dir.path().join("bad-id.toml");
    fs::write(&path, "app_id = \"short\"\n").unwrap();
    match AccessConfig::from_toml(&path) {
        Err(ConfigError::InvalidAppId(_)) => {}
        _ => panic!("Expected InvalidAppId"),
    }
}

// Each env test uses its own prefix so tests can run in parallel.

#[test]
fn test_config_from_env() {
    env::set_var("RTC_ENV_TEST_APP_ID", APP_ID);
    env::set_var("RTC_ENV_TEST_APP_CERTIFICATE", CERT);
    env::set_var("RTC_ENV_TEST_EXPIRE_SECONDS", "900");
    env::set_var("RTC_ENV_TEST_ROLE", "Subscriber");

    let config = AccessConfig::from_env("RTC_ENV_TEST").unwrap();
    assert_eq!(config.app_id, APP_ID);
    assert_eq!(config.app_certificate.as_deref(), Some(CERT));
    assert_eq!(config.default_expire_seconds, 900);
    assert_eq!(config.default_role, Role::Subscriber);
}

#[test]
fn test_config_from_env_tokenless() {
    env::set_var("RTC_ENV_TOKENLESS_APP_ID", APP_ID);
    env::set_var("RTC_ENV_TOKENLESS_APP_CERTIFICATE", "");

    let config = AccessConfig::from_env("RTC_ENV_TOKENLESS").unwrap();
    assert_eq!(config.app_certificate, None);
    assert!(config.is_tokenless());
}

#[test]
fn test_config_from_env_errors() {
    match AccessConfig::from_env("RTC_ENV_UNSET") {
        Err(ConfigError::MissingAppId) => {}
        _ => panic!("Expected MissingAppId error"),
    }

    env::set_var("RTC_ENV_BAD_EXPIRY_APP_ID", APP_ID);
    env::set_var("RTC_ENV_BAD_EXPIRY_EXPIRE_SECONDS", "soon");
    match AccessConfig::from_env("RTC_ENV_BAD_EXPIRY") {
        Err(ConfigError::InvalidExpiry(value)) => assert_eq!(value, "soon"),
        _ => panic!("Expected InvalidExpiry error"),
    }

    env::set_var("RTC_ENV_BAD_ROLE_APP_ID", APP_ID);
    env::set_var("RTC_ENV_BAD_ROLE_ROLE", "admin");
    match AccessConfig::from_env("RTC_ENV_BAD_ROLE") {
        Err(ConfigError::InvalidRole(value)) => assert_eq!(value, "admin"),
        _ => panic!("Expected InvalidRole error"),
    }
}

#[test]
fn test_config_from_env_or_file() {
    let dir = tempfile::tempdir().unwrap();
    let cert_path = dir.path().join("certificate");
    fs::write(&cert_path, format!("{CERT}\n")).unwrap();

    env::set_var("RTC_ENV_FILE_APP_ID", APP_ID);
    env::set_var("RTC_ENV_FILE_APP_CERTIFICATE", "ignored-when-file-set");
    env::set_var("RTC_ENV_FILE_APP_CERTIFICATE_FILE", &cert_path);

    let config = AccessConfig::from_env_or_file("RTC_ENV_FILE").unwrap();
    assert_eq!(config.app_certificate.as_deref(), Some(CERT));

    env::set_var("RTC_ENV_MISSING_FILE_APP_ID", APP_ID);
    env::set_var(
        "RTC_ENV_MISSING_FILE_APP_CERTIFICATE_FILE",
        dir.path().join("nope"),
    );
    match AccessConfig::from_env_or_file("RTC_ENV_MISSING_FILE") {
        Err(ConfigError::IOError(_)) => {}
        _ => panic!("Expected IOError"),
    }
}

#[test]
fn test_config_error_messages() {
    let message = ConfigError::MissingAppId.to_string();
    assert!(message.contains("AGORA_APP_ID"));
    let message = ConfigError::InvalidRole("admin".to_string()).to_string();
    assert!(message.contains("admin"));
}
