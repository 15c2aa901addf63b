use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tracing::debug;

use crate::crc::crc32;
use crate::error::TokenError;
use crate::identity::Identity;
use crate::message::PrivilegeMessage;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_LEN: usize = 32;
pub const APP_ID_LEN: usize = 16;

/// Size of the fixed fields preceding the privilege message.
pub const FIXED_LEN: usize = SIGNATURE_LEN + APP_ID_LEN + 4 + 4;

/// Per-build values mixed into the signature but never stored in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureSalt {
    /// Random 32-bit salt.
    pub salt: u32,
    /// Build time in seconds since epoch.
    pub ts: u32,
}

impl SignatureSalt {
    /// Draw a fresh salt from the OS random source and capture the current time.
    pub fn fresh() -> Result<Self, TokenError> {
        let mut bytes = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenError::generic(format!("random source unavailable: {e}")))?;
        Ok(Self {
            salt: u32::from_be_bytes(bytes),
            ts: unix_now()?,
        })
    }
}

/// Current time in whole seconds since epoch, as carried by the token format.
pub fn unix_now() -> Result<u32, TokenError> {
    let now = Utc::now().timestamp();
    u32::try_from(now)
        .map_err(|_| TokenError::encoding(format!("timestamp {now} exceeds 32 bits")))
}

/// Decode a 32-hex-character application identifier to its 16 raw bytes.
///
/// Hyphens are stripped first, so UUID-style identifiers are accepted.
pub fn decode_app_id(app_id: &str) -> Result<[u8; APP_ID_LEN], TokenError> {
    if app_id.is_empty() {
        return Err(TokenError::MissingAppId);
    }

    let stripped: String = app_id.chars().filter(|c| *c != '-').collect();
    if stripped.len() != APP_ID_LEN * 2 {
        return Err(TokenError::InvalidAppId(format!(
            "expected {} hex characters, got {}",
            APP_ID_LEN * 2,
            stripped.len()
        )));
    }

    let mut out = [0u8; APP_ID_LEN];
    hex::decode_to_slice(&stripped, &mut out)
        .map_err(|e| TokenError::InvalidAppId(e.to_string()))?;
    Ok(out)
}

/// The binary payload of a token, before version tagging and base64.
///
/// ```text
/// signature[32] | app_id[16] | channel_crc:u32 | uid_crc:u32 | message
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub signature: [u8; SIGNATURE_LEN],
    pub app_id: [u8; APP_ID_LEN],
    pub channel_crc: u32,
    pub uid_crc: u32,
    pub message: PrivilegeMessage,
}

impl ContentBlock {
    pub fn to_bytes(&self) -> Result<Vec<u8>, TokenError> {
        let message = self.message.encode()?;
        let mut buf = Vec::with_capacity(FIXED_LEN + message.len());
        buf.extend_from_slice(&self.signature);
        buf.extend_from_slice(&self.app_id);
        buf.extend_from_slice(&self.channel_crc.to_be_bytes());
        buf.extend_from_slice(&self.uid_crc.to_be_bytes());
        buf.extend_from_slice(&message);
        Ok(buf)
    }

    /// Parse a content block, the inverse of [`ContentBlock::to_bytes`].
    ///
    /// The message section is decoded tolerantly; only the fixed fields are
    /// required.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        if bytes.len() < FIXED_LEN {
            return Err(TokenError::malformed(format!(
                "content block is {} bytes, expected at least {FIXED_LEN}",
                bytes.len()
            )));
        }

        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&bytes[..SIGNATURE_LEN]);
        let mut app_id = [0u8; APP_ID_LEN];
        app_id.copy_from_slice(&bytes[SIGNATURE_LEN..SIGNATURE_LEN + APP_ID_LEN]);

        Ok(Self {
            signature,
            app_id,
            channel_crc: read_u32(&bytes[48..52]),
            uid_crc: read_u32(&bytes[52..56]),
            message: PrivilegeMessage::decode(&bytes[FIXED_LEN..]),
        })
    }
}

pub(crate) fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Build a signed content block granting `identity` the right to join `channel`
/// until `privilege_expire_ts`.
///
/// A fresh random salt and the current time are mixed into the signature, so
/// two calls with identical arguments produce different signatures over the
/// same visible fields.
///
/// # Errors
///
/// - [`TokenError::MissingAppId`] / [`TokenError::InvalidAppId`] for a bad app id
/// - [`TokenError::MissingCertificate`] for an empty certificate
/// - [`TokenError::Generic`] if the OS random source fails
pub fn build_content_block(
    app_id: &str,
    app_certificate: &[u8],
    channel: &str,
    identity: &Identity,
    privilege_expire_ts: u32,
) -> Result<ContentBlock, TokenError> {
    build_content_block_with(
        app_id,
        app_certificate,
        channel,
        identity,
        privilege_expire_ts,
        SignatureSalt::fresh()?,
    )
}

/// Same as [`build_content_block`] with caller-supplied salt and timestamp.
pub fn build_content_block_with(
    app_id: &str,
    app_certificate: &[u8],
    channel: &str,
    identity: &Identity,
    privilege_expire_ts: u32,
    salt: SignatureSalt,
) -> Result<ContentBlock, TokenError> {
    let app_id = decode_app_id(app_id)?;
    if app_certificate.is_empty() {
        return Err(TokenError::MissingCertificate);
    }

    let channel_bytes = channel.as_bytes();
    let message = PrivilegeMessage::join_channel(privilege_expire_ts);
    let message_bytes = message.encode()?;

    let signature = sign(
        app_certificate,
        &[
            &app_id,
            channel_bytes,
            &identity.to_signature_bytes(),
            &salt.salt.to_be_bytes(),
            &salt.ts.to_be_bytes(),
            &message_bytes,
        ],
    )?;

    debug!(
        channel,
        numeric_identity = identity.is_numeric(),
        privilege_expire_ts,
        "built content block"
    );

    Ok(ContentBlock {
        signature,
        app_id,
        channel_crc: crc32(channel_bytes),
        uid_crc: crc32(&identity.to_checksum_bytes()),
        message,
    })
}

fn sign(key: &[u8], parts: &[&[u8]]) -> Result<[u8; SIGNATURE_LEN], TokenError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| TokenError::generic(format!("failed to initialise HMAC: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(&mac.finalize().into_bytes());
    Ok(signature)
}
