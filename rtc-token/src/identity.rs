//! Caller identity normalization.
//!
//! An identity is decided once, at the boundary: a string made only of ASCII
//! decimal digits is numeric, anything else is a textual account.
//!
//! The two encodings of the same identity intentionally differ. The signed
//! input carries a numeric identity as 4 big-endian bytes, while the checksum
//! in the content block is always computed over the decimal text. Unifying
//! them would change the signature of every numeric-identity token.

use std::fmt;
use std::str::FromStr;

use crate::error::TokenError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Numeric(u32),
    Text(String),
}

impl Identity {
    /// Classify `raw` as numeric or textual.
    ///
    /// All-digit input larger than `u32::MAX` is rejected rather than wrapped.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            raw.parse::<u32>()
                .map(Identity::Numeric)
                .map_err(|_| TokenError::IdentityOverflow(raw.to_string()))
        } else {
            Ok(Identity::Text(raw.to_string()))
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Identity::Numeric(_))
    }

    /// Bytes mixed into the signed input.
    pub fn to_signature_bytes(&self) -> Vec<u8> {
        match self {
            Identity::Numeric(uid) => uid.to_be_bytes().to_vec(),
            Identity::Text(account) => account.as_bytes().to_vec(),
        }
    }

    /// Bytes the identity checksum is computed over: always the text form.
    pub fn to_checksum_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Numeric(uid) => write!(f, "{uid}"),
            Identity::Text(account) => f.write_str(account),
        }
    }
}

impl FromStr for Identity {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identity::parse(s)
    }
}

impl From<u32> for Identity {
    fn from(uid: u32) -> Self {
        Identity::Numeric(uid)
    }
}
