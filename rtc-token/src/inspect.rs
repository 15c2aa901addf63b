use serde::Serialize;

use crate::error::TokenError;
use crate::message::{declared_count, PrivilegeItem, PrivilegeMessage};
use crate::mint::{read_u32, APP_ID_LEN, FIXED_LEN, SIGNATURE_LEN};
use crate::utils::{decode_payload, split_token, TokenParts};

/// Decoded privilege message section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    /// Entry count announced by the message prefix; `0` when absent.
    pub count: u16,
    /// The entries that were actually present.
    pub items: Vec<PrivilegeItem>,
}

/// Structural view of a token, as produced by [`inspect`].
///
/// Serializes to the JSON consumed by inspection tooling. No signature check
/// is implied: the certificate is not needed, or used, to build a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    /// Version tag, empty when the token carried none.
    pub token_version: String,
    /// Length of the base64 payload in characters.
    pub token_base64_length: usize,
    /// Decoded content block length in bytes.
    pub byte_length: usize,
    pub signature_hex: String,
    pub app_id_hex: String,
    /// App id bytes with non-printable characters replaced by `.`.
    pub app_id_ascii: String,
    pub channel_crc: Option<u32>,
    pub uid_crc: Option<u32>,
    pub message: MessageView,
    pub message_hex: String,
    pub raw_hex: String,
    /// Set only by [`inspect_lenient`] when the token could not be fully decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenView {
    fn from_raw(parts: TokenParts<'_>, raw: &[u8]) -> Self {
        let signature = &raw[..raw.len().min(SIGNATURE_LEN)];
        let app_id = raw
            .get(SIGNATURE_LEN..raw.len().min(SIGNATURE_LEN + APP_ID_LEN))
            .unwrap_or_default();
        let message_bytes = raw.get(FIXED_LEN..).unwrap_or_default();

        TokenView {
            token_version: parts.version.to_string(),
            token_base64_length: parts.payload.len(),
            byte_length: raw.len(),
            signature_hex: hex::encode(signature),
            app_id_hex: hex::encode(app_id),
            app_id_ascii: printable_ascii(app_id),
            channel_crc: raw.get(48..52).map(read_u32),
            uid_crc: raw.get(52..56).map(read_u32),
            message: MessageView {
                count: declared_count(message_bytes).unwrap_or(0),
                items: PrivilegeMessage::decode(message_bytes).items().to_vec(),
            },
            message_hex: hex::encode(message_bytes),
            raw_hex: hex::encode(raw),
            error: None,
        }
    }

    /// The privilege entries as an ordered mapping.
    pub fn privileges(&self) -> PrivilegeMessage {
        self.message
            .items
            .iter()
            .map(|item| (item.privilege, item.expire_ts))
            .collect()
    }

    /// Whether every item announced by the message prefix was present.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.message.items.len() == self.message.count as usize
    }
}

/// Decode a token into its structural fields without verifying it.
///
/// The version tag is optional. The payload must be valid base64 and decode
/// to at least the fixed-size fields; a truncated privilege message is
/// tolerated and decoded as far as it goes.
///
/// # Errors
///
/// Returns [`TokenError::MalformedToken`] if the payload is not base64 or is
/// shorter than the fixed fields.
pub fn inspect(token: &str) -> Result<TokenView, TokenError> {
    let parts = split_token(token);
    let raw = decode_payload(parts.payload)?;
    if raw.len() < FIXED_LEN {
        return Err(TokenError::malformed(format!(
            "content block is {} bytes, expected at least {FIXED_LEN}",
            raw.len()
        )));
    }
    Ok(TokenView::from_raw(parts, &raw))
}

/// Best-effort variant of [`inspect`] that never fails.
///
/// Whatever could be recovered is filled in; fields that could not be read
/// are empty or `None`, and `error` describes what went wrong.
pub fn inspect_lenient(token: &str) -> TokenView {
    let parts = split_token(token);
    match inspect(token) {
        Ok(view) => view,
        Err(err) => {
            let raw = decode_payload(parts.payload).unwrap_or_default();
            let mut view = TokenView::from_raw(parts, &raw);
            view.error = Some(err.to_string());
            view
        }
    }
}

fn printable_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if (0x20..0x7f).contains(&b) {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}
