use thiserror::Error;

/// Errors produced while building, encoding or inspecting access tokens.
///
/// Tokenless mode (no certificate configured) is not represented here:
/// issuing functions return `Ok(None)` for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The application identifier was not supplied.
    #[error("app id is required")]
    MissingAppId,

    /// The application identifier is not 32 hex characters once hyphens are removed.
    #[error("invalid app id: {0}")]
    InvalidAppId(String),

    /// The builder was called without a signing certificate.
    #[error("app certificate is required to sign a token")]
    MissingCertificate,

    /// A numeric identity does not fit in an unsigned 32-bit integer.
    #[error("numeric identity '{0}' exceeds the 32-bit unsigned range")]
    IdentityOverflow(String),

    /// A privilege message or timestamp exceeds its field width.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The token could not be decoded into a content block.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A role name other than `publisher` or `subscriber`.
    #[error("unknown role '{0}', expected 'publisher' or 'subscriber'")]
    InvalidRole(String),

    /// Any other failure, such as the OS random source being unavailable.
    #[error("{0}")]
    Generic(String),
}

impl TokenError {
    pub fn generic(msg: impl Into<String>) -> Self {
        TokenError::Generic(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        TokenError::Encoding(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        TokenError::MalformedToken(msg.into())
    }
}
