//! # RTC Token
//!
//! Codec for short-lived channel access tokens.
//!
//! A token grants an identity the right to join a named real-time channel
//! until an expiry timestamp. This crate builds and signs tokens, frames them
//! for the wire, and decodes them back into their structural fields for
//! inspection. It has no networking or configuration dependencies.
//!
//! ## Token format
//!
//! ```text
//! token   = "006" base64(content)
//! content = hmac_sha256[32] | app_id[16] | crc32(channel):u32 | crc32(uid):u32 | message
//! message = count:u16 | count * (privilege:u16, expire_ts:u32)
//! ```
//!
//! The signature covers the app id, channel, identity, a random salt, the
//! issue time and the message. Salt and issue time are not carried in the
//! token, so a token cannot be re-verified from its contents alone.
//!
//! ## Usage
//!
//! ```no_run
//! use rtc_token::{inspect, issue, Identity, IssueOptions};
//!
//! fn main() -> Result<(), rtc_token::TokenError> {
//!     let identity = Identity::parse("12345")?;
//!     let token = issue(
//!         Some("4a410e05b4554ec1a81555f44bc3228e"),
//!         Some("02f9818234cb497d8ec7770cec6ffb82"),
//!         "finmentor-channel",
//!         &identity,
//!         IssueOptions::default(),
//!     )?;
//!
//!     match token {
//!         Some(token) => {
//!             let view = inspect(&token)?;
//!             println!("app id: {}", view.app_id_hex);
//!         }
//!         None => println!("tokenless mode"),
//!     }
//!     Ok(())
//! }
//! ```

mod crc;
mod error;
mod identity;
mod inspect;
mod message;
mod mint;
mod token;
mod utils;

pub use crc::crc32;
pub use error::TokenError;
pub use identity::Identity;
pub use inspect::{inspect, inspect_lenient, MessageView, TokenView};
pub use message::{declared_count, PrivilegeItem, PrivilegeMessage, JOIN_CHANNEL};
pub use mint::{
    build_content_block, build_content_block_with, decode_app_id, unix_now, ContentBlock,
    SignatureSalt, APP_ID_LEN, FIXED_LEN, SIGNATURE_LEN,
};
pub use token::{issue, issue_rtm, IssueOptions, Role, TokenMode, DEFAULT_EXPIRE_SECONDS};
pub use utils::{decode_payload, encode_token, split_token, TokenParts, VERSION};

#[cfg(test)]
mod tests {
    use super::*;

    const APP_ID: &str = "4a410e05b4554ec1a81555f44bc3228e";
    const CERT: &str = "02f9818234cb497d8ec7770cec6ffb82";

    #[test]
    fn test_issue_then_inspect() {
        let identity = Identity::parse("12345").unwrap();
        let options = IssueOptions::default();
        let before = unix_now().unwrap();
        let token = issue(
            Some(APP_ID),
            Some(CERT),
            "finmentor-channel",
            &identity,
            options,
        )
        .unwrap()
        .expect("certificate configured, token expected");
        let after = unix_now().unwrap();

        let view = inspect(&token).unwrap();
        assert_eq!(view.byte_length, FIXED_LEN + 8);
        assert_eq!(view.app_id_hex, APP_ID);
        assert_eq!(view.channel_crc, Some(crc32(b"finmentor-channel")));
        assert_eq!(view.uid_crc, Some(crc32(b"12345")));
        assert_eq!(view.message.count, 1);
        assert_eq!(view.message.items[0].privilege, JOIN_CHANNEL);

        let expire_ts = view.message.items[0].expire_ts;
        assert!(expire_ts >= before + options.expire_seconds);
        assert!(expire_ts <= after + options.expire_seconds);
    }

    #[test]
    fn test_issue_is_not_deterministic() {
        let identity = Identity::Text("alice".to_string());
        let issue_once = || {
            issue(
                Some(APP_ID),
                Some(CERT),
                "room",
                &identity,
                IssueOptions::default(),
            )
            .unwrap()
            .unwrap()
        };

        let a = inspect(&issue_once()).unwrap();
        let b = inspect(&issue_once()).unwrap();
        assert_ne!(a.signature_hex, b.signature_hex);
        assert_eq!(a.app_id_hex, b.app_id_hex);
        assert_eq!(a.channel_crc, b.channel_crc);
        assert_eq!(a.uid_crc, b.uid_crc);
        assert_eq!(a.message.count, b.message.count);
    }

    #[test]
    fn test_content_block_round_trip_through_wire_form() {
        let identity = Identity::Numeric(99);
        let block = build_content_block(APP_ID, CERT.as_bytes(), "room", &identity, 1234).unwrap();
        let token = encode_token(&block.to_bytes().unwrap());
        let parts = split_token(&token);
        assert_eq!(parts.version, VERSION);
        let decoded = ContentBlock::from_bytes(&decode_payload(parts.payload).unwrap()).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_rtm_token_has_empty_channel() {
        let account = Identity::Text("alice@example.com".to_string());
        let token = issue_rtm(Some(APP_ID), Some(CERT), &account, IssueOptions::default())
            .unwrap()
            .unwrap();
        let view = inspect(&token).unwrap();
        assert_eq!(view.channel_crc, Some(0));
        assert_eq!(view.uid_crc, Some(crc32(b"alice@example.com")));
    }
}
