use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::TokenError;
use crate::identity::Identity;
use crate::mint::{build_content_block, unix_now};
use crate::utils::encode_token;

/// Default token lifetime: one hour.
pub const DEFAULT_EXPIRE_SECONDS: u32 = 3600;

/// Role requested for a channel join.
///
/// The role is accepted and validated, but it is not bound into the signed
/// payload: every token carries the single join-channel privilege.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Publisher,
    Subscriber,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Publisher => f.write_str("publisher"),
            Role::Subscriber => f.write_str("subscriber"),
        }
    }
}

impl FromStr for Role {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "publisher" => Ok(Role::Publisher),
            "subscriber" => Ok(Role::Subscriber),
            _ => Err(TokenError::InvalidRole(s.to_string())),
        }
    }
}

/// Options controlling token issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueOptions {
    pub role: Role,
    /// Lifetime in seconds, added to the current time to form the expiry.
    pub expire_seconds: u32,
}

impl Default for IssueOptions {
    fn default() -> Self {
        Self {
            role: Role::default(),
            expire_seconds: DEFAULT_EXPIRE_SECONDS,
        }
    }
}

impl IssueOptions {
    /// Absolute expiry for a token issued now.
    pub fn privilege_expire_ts(&self) -> Result<u32, TokenError> {
        let now = unix_now()?;
        now.checked_add(self.expire_seconds).ok_or_else(|| {
            TokenError::encoding(format!(
                "expiry {now} + {} exceeds 32 bits",
                self.expire_seconds
            ))
        })
    }
}

/// Issue a channel-join token.
///
/// # Arguments
///
/// * `app_id` - 32-hex-character application identifier
/// * `app_certificate` - Signing secret, or `None` when the app runs without tokens
/// * `channel` - Channel name
/// * `identity` - Numeric uid or textual account joining the channel
/// * `options` - Role and lifetime
///
/// # Returns
///
/// * `Ok(Some(token))` - The wire-form token
/// * `Ok(None)` - Tokenless mode: no certificate is configured
/// * `Err(TokenError)` - The app id is missing or invalid, or signing failed
pub fn issue(
    app_id: Option<&str>,
    app_certificate: Option<&str>,
    channel: &str,
    identity: &Identity,
    options: IssueOptions,
) -> Result<Option<String>, TokenError> {
    let app_id = app_id
        .filter(|id| !id.is_empty())
        .ok_or(TokenError::MissingAppId)?;

    let Some(certificate) = app_certificate.filter(|c| !c.is_empty()) else {
        info!(channel, "no app certificate configured, issuing in tokenless mode");
        return Ok(None);
    };

    let privilege_expire_ts = options.privilege_expire_ts()?;
    debug!(channel, role = %options.role, privilege_expire_ts, "issuing channel token");

    let block = build_content_block(
        app_id,
        certificate.as_bytes(),
        channel,
        identity,
        privilege_expire_ts,
    )?;
    Ok(Some(encode_token(&block.to_bytes()?)))
}

/// Issue a messaging token for `user_account`.
///
/// Messaging tokens use the same layout with an empty channel name. The role
/// in `options` is ignored.
pub fn issue_rtm(
    app_id: Option<&str>,
    app_certificate: Option<&str>,
    user_account: &Identity,
    options: IssueOptions,
) -> Result<Option<String>, TokenError> {
    issue(app_id, app_certificate, "", user_account, options)
}

/// Whether a token was issued or the app runs in tokenless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMode {
    Secure,
    Tokenless,
}

impl TokenMode {
    pub fn of(token: Option<&str>) -> Self {
        match token {
            Some(_) => TokenMode::Secure,
            None => TokenMode::Tokenless,
        }
    }
}

impl fmt::Display for TokenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenMode::Secure => f.write_str("secure"),
            TokenMode::Tokenless => f.write_str("tokenless"),
        }
    }
}
