use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::TokenError;

/// Version tag prefixed to every token.
pub const VERSION: &str = "006";

/// A token string split into its version tag and base64 payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParts<'a> {
    /// The version tag, or `""` when the token carried none.
    pub version: &'a str,
    /// The base64-encoded content block.
    pub payload: &'a str,
}

/// Encode a content block to its wire form
///
/// # Arguments
///
/// * `content` - Binary content block
///
/// # Returns
///
/// The version tag followed by the base64 encoded content
pub fn encode_token(content: &[u8]) -> String {
    let mut token = String::with_capacity(VERSION.len() + content.len().div_ceil(3) * 4);
    token.push_str(VERSION);
    STANDARD.encode_string(content, &mut token);
    token
}

/// Split a token into version tag and payload.
///
/// Parsing is lenient: a token without the version tag is treated as a bare
/// payload.
pub fn split_token(token: &str) -> TokenParts<'_> {
    let token = token.trim();
    match token.strip_prefix(VERSION) {
        Some(payload) => TokenParts {
            version: VERSION,
            payload,
        },
        None => TokenParts {
            version: "",
            payload: token,
        },
    }
}

/// Decode the base64 payload of a token to its binary content block
///
/// # Arguments
///
/// * `payload` - Base64 payload, without the version tag
///
/// # Returns
///
/// Binary content or TokenError::MalformedToken if decoding fails
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, TokenError> {
    STANDARD
        .decode(payload)
        .map_err(|e| TokenError::malformed(format!("invalid base64 payload: {e}")))
}
