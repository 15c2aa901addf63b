//! # RTC Access
//!
//! Issue and inspect short-lived access tokens for real-time channels.
//!
//! This crate combines the token codec from `rtc-token` with configuration
//! management, so an application can hold its credentials in one place and
//! hand out tokens for callers joining a channel.
//!
//! ## Features
//!
//! - **Flexible configuration**: Load credentials from environment variables, JSON or TOML files
//! - **Tokenless mode**: Without an app certificate no tokens are issued, and callers are told so
//! - **Self-checking issuance**: Every issued token is decoded again and compared with its inputs
//! - **Inspection**: Decode any token into its structural fields as JSON-ready data
//!
//! ## Basic Usage
//!
//! ```rust
//! use rtc_access::{AccessConfig, AccessTokenService, TokenMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AccessConfig::new(
//!     "4a410e05b4554ec1a81555f44bc3228e",
//!     Some("02f9818234cb497d8ec7770cec6ffb82"),
//! );
//! let service = AccessTokenService::new(config)?;
//!
//! let issued = service.issue("finmentor-channel", "12345")?;
//! assert_eq!(issued.mode(), TokenMode::Secure);
//!
//! let view = service.inspect(issued.token.as_deref().unwrap_or_default())?;
//! assert_eq!(view.message.count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! When using `from_env()` or `from_env_or_file()`, the following variables are expected:
//!
//! - `{PREFIX}_APP_ID`: The 32-hex-character application identifier
//! - `{PREFIX}_APP_CERTIFICATE` or `{PREFIX}_APP_CERTIFICATE_FILE`: The signing certificate (optional)
//! - `{PREFIX}_EXPIRE_SECONDS`: Token lifetime in seconds (optional, defaults to 3600)
//! - `{PREFIX}_ROLE`: Either "publisher" or "subscriber" (optional, defaults to "publisher")
//!
//! ```rust
//! use rtc_access::{AccessConfig, set_default_config, get_default_config};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. From a JSON file
//! let config = AccessConfig::from_file("./rtc.json")?;
//!
//! // 2. From environment variables
//! let config = AccessConfig::from_env("AGORA")?;
//!
//! // 3. From environment variables with file references
//! let config = AccessConfig::from_env_or_file("AGORA")?;
//!
//! // Set as the process-wide default
//! set_default_config(config)?;
//! let config = get_default_config().expect("default configured");
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

mod config;

pub use config::{
    get_default_config, set_default_config, try_load_default_config, AccessConfig,
    AccessConfigBuilder, ConfigError, DEFAULT_ENV_PREFIX,
};

pub use rtc_token::{
    crc32, decode_app_id, inspect_lenient, Identity, IssueOptions, MessageView, PrivilegeItem,
    PrivilegeMessage, Role, TokenError, TokenMode, TokenView, DEFAULT_EXPIRE_SECONDS,
    JOIN_CHANNEL, VERSION,
};

/// Errors that can occur in the access token SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Token error
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// An issued token did not decode back to its inputs
    #[error("Issued token failed self-check: {0}")]
    Integrity(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of an issue call.
///
/// Serializes to the shape handed to clients: the token (or `null` in
/// tokenless mode), the app id, channel and uid it was issued for, and
/// the mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: Option<String>,
    pub app_id: String,
    pub channel: String,
    pub uid: String,
    pub token_mode: TokenMode,
    /// Expiry read back from the issued token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssuedToken {
    pub fn mode(&self) -> TokenMode {
        self.token_mode
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SdkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A token together with its decoded view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectedToken {
    #[serde(flatten)]
    pub issued: IssuedToken,
    /// `None` in tokenless mode.
    pub view: Option<TokenView>,
}

/// Token issuing service bound to one application's credentials
///
/// # Example
///
/// ```
/// use rtc_access::{AccessTokenService, TokenMode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = AccessTokenService::builder()
///     .app_id("4a410e05b4554ec1a81555f44bc3228e")
///     .build()?;
///
/// // No certificate: tokenless mode
/// let issued = service.issue("lobby", "42")?;
/// assert_eq!(issued.token, None);
/// assert_eq!(issued.mode(), TokenMode::Tokenless);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AccessTokenService {
    config: AccessConfig,
}

impl AccessTokenService {
    /// Create a new service from a validated configuration
    pub fn new(config: AccessConfig) -> Result<Self, SdkError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn builder() -> AccessTokenServiceBuilder {
        AccessTokenServiceBuilder::new()
    }

    /// Create a service from the global default configuration, falling back
    /// to the standard configuration locations.
    pub fn from_default_config() -> Result<Self, SdkError> {
        match get_default_config() {
            Some(config) => Self::new(config.clone()),
            None => {
                let config = try_load_default_config().ok_or(ConfigError::MissingAppId)?;
                Self::new(config)
            }
        }
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Mode every token from this service is issued in.
    pub fn token_mode(&self) -> TokenMode {
        if self.config.is_tokenless() {
            TokenMode::Tokenless
        } else {
            TokenMode::Secure
        }
    }

    /// Issue a channel token using the configured defaults.
    ///
    /// `uid` is normalized with [`Identity::parse`]: all-digit strings are
    /// numeric uids, anything else is a user account.
    pub fn issue(&self, channel: &str, uid: &str) -> Result<IssuedToken, SdkError> {
        let identity = Identity::parse(uid)?;
        self.issue_with(channel, &identity, self.config.issue_options())
    }

    /// Issue a channel token with explicit options.
    pub fn issue_with(
        &self,
        channel: &str,
        identity: &Identity,
        options: IssueOptions,
    ) -> Result<IssuedToken, SdkError> {
        let token = rtc_token::issue(
            Some(&self.config.app_id),
            self.config.app_certificate.as_deref(),
            channel,
            identity,
            options,
        )?;
        self.finish(token, channel, identity)
    }

    /// Issue a messaging token for a user account.
    ///
    /// Messaging tokens are channel tokens with an empty channel name. The
    /// account goes through [`Identity::parse`], so an all-digit account is
    /// signed as a numeric uid.
    pub fn issue_rtm(&self, user_account: &str) -> Result<IssuedToken, SdkError> {
        let identity = Identity::parse(user_account)?;
        let token = rtc_token::issue_rtm(
            Some(&self.config.app_id),
            self.config.app_certificate.as_deref(),
            &identity,
            self.config.issue_options(),
        )?;
        self.finish(token, "", &identity)
    }

    /// Decode a token into its structural fields.
    pub fn inspect(&self, token: &str) -> Result<TokenView, SdkError> {
        Ok(rtc_token::inspect(token)?)
    }

    /// Issue a channel token and return it with its decoded view.
    pub fn issue_and_inspect(&self, channel: &str, uid: &str) -> Result<InspectedToken, SdkError> {
        let issued = self.issue(channel, uid)?;
        let view = match issued.token.as_deref() {
            Some(token) => Some(self.inspect(token)?),
            None => None,
        };
        Ok(InspectedToken { issued, view })
    }

    fn finish(
        &self,
        token: Option<String>,
        channel: &str,
        identity: &Identity,
    ) -> Result<IssuedToken, SdkError> {
        let expires_at = match token.as_deref() {
            Some(token) => {
                let view = rtc_token::inspect(token)?;
                self.check_issued(&view, channel, identity)?;
                let expire_ts = view.privileges().get(JOIN_CHANNEL).unwrap_or_default();
                DateTime::from_timestamp(i64::from(expire_ts), 0)
            }
            None => None,
        };

        let issued = IssuedToken {
            token_mode: TokenMode::of(token.as_deref()),
            token,
            app_id: self.config.app_id.clone(),
            channel: channel.to_string(),
            uid: identity.to_string(),
            expires_at,
        };
        debug!(channel, mode = %issued.token_mode, "token issued");
        Ok(issued)
    }

    fn check_issued(
        &self,
        view: &TokenView,
        channel: &str,
        identity: &Identity,
    ) -> Result<(), SdkError> {
        let app_id = hex::encode(decode_app_id(&self.config.app_id)?);
        let mismatch = if view.app_id_hex != app_id {
            Some("app id")
        } else if view.channel_crc != Some(crc32(channel.as_bytes())) {
            Some("channel checksum")
        } else if view.uid_crc != Some(crc32(&identity.to_checksum_bytes())) {
            Some("uid checksum")
        } else if view.privileges().get(JOIN_CHANNEL).is_none() {
            Some("join privilege")
        } else {
            None
        };

        match mismatch {
            Some(field) => {
                warn!(channel, field, "issued token does not match its inputs");
                Err(SdkError::Integrity(format!("{field} mismatch")))
            }
            None => Ok(()),
        }
    }
}

/// Builder for AccessTokenService instances
#[derive(Default)]
pub struct AccessTokenServiceBuilder {
    config: AccessConfigBuilder,
}

impl AccessTokenServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: &AccessConfig) -> Self {
        Self {
            config: AccessConfigBuilder::from_config(config),
        }
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.config = self.config.app_id(app_id);
        self
    }

    pub fn app_certificate(mut self, certificate: impl Into<String>) -> Self {
        self.config = self.config.app_certificate(certificate);
        self
    }

    pub fn default_expire_seconds(mut self, seconds: u32) -> Self {
        self.config = self.config.default_expire_seconds(seconds);
        self
    }

    pub fn default_role(mut self, role: Role) -> Self {
        self.config = self.config.default_role(role);
        self
    }

    /// Build the service
    pub fn build(self) -> Result<AccessTokenService, SdkError> {
        AccessTokenService::new(self.config.build()?)
    }
}
