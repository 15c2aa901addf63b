//! Privilege message: an ordered `privilege -> expiry` mapping.
//!
//! Wire layout, big-endian throughout:
//!
//! ```text
//! count:u16 | count * (privilege:u16, expire_ts:u32)
//! ```

use serde::Serialize;

use crate::error::TokenError;

/// Privilege code granting the right to join a channel.
pub const JOIN_CHANNEL: u16 = 1;

/// Encoded size of the count prefix.
pub const COUNT_LEN: usize = 2;

/// Encoded size of a single `(privilege, expire_ts)` item.
pub const ITEM_LEN: usize = 6;

/// A single privilege entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivilegeItem {
    pub privilege: u16,
    pub expire_ts: u32,
}

/// Ordered mapping from privilege code to expiry timestamp (seconds since epoch).
///
/// Entries keep insertion order. Inserting an existing code replaces its
/// expiry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeMessage {
    items: Vec<PrivilegeItem>,
}

impl PrivilegeMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single-entry message used for channel joins.
    pub fn join_channel(expire_ts: u32) -> Self {
        let mut message = Self::new();
        message.insert(JOIN_CHANNEL, expire_ts);
        message
    }

    pub fn insert(&mut self, privilege: u16, expire_ts: u32) {
        match self.items.iter_mut().find(|i| i.privilege == privilege) {
            Some(item) => item.expire_ts = expire_ts,
            None => self.items.push(PrivilegeItem {
                privilege,
                expire_ts,
            }),
        }
    }

    /// Insert from wider integers, rejecting values that do not fit their field.
    pub fn try_insert(&mut self, privilege: u64, expire_ts: u64) -> Result<(), TokenError> {
        let code = u16::try_from(privilege).map_err(|_| {
            TokenError::encoding(format!("privilege code {privilege} exceeds 16 bits"))
        })?;
        let expiry = u32::try_from(expire_ts).map_err(|_| {
            TokenError::encoding(format!("expiry timestamp {expire_ts} exceeds 32 bits"))
        })?;
        self.insert(code, expiry);
        Ok(())
    }

    pub fn get(&self, privilege: u16) -> Option<u32> {
        self.items
            .iter()
            .find(|i| i.privilege == privilege)
            .map(|i| i.expire_ts)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[PrivilegeItem] {
        &self.items
    }

    /// Serialize to the wire layout.
    ///
    /// Fails with [`TokenError::Encoding`] when there are more than 65535 entries.
    pub fn encode(&self) -> Result<Vec<u8>, TokenError> {
        let count = u16::try_from(self.items.len()).map_err(|_| {
            TokenError::encoding(format!(
                "privilege message has {} entries, at most {} allowed",
                self.items.len(),
                u16::MAX
            ))
        })?;

        let mut buf = Vec::with_capacity(COUNT_LEN + ITEM_LEN * self.items.len());
        buf.extend_from_slice(&count.to_be_bytes());
        for item in &self.items {
            buf.extend_from_slice(&item.privilege.to_be_bytes());
            buf.extend_from_slice(&item.expire_ts.to_be_bytes());
        }
        Ok(buf)
    }

    /// Parse the wire layout, decoding as many whole items as are present.
    ///
    /// Truncated input is not an error: items that do not fit are dropped, and
    /// an input shorter than the count prefix yields an empty message. Items
    /// are kept exactly as written, duplicates included.
    pub fn decode(bytes: &[u8]) -> Self {
        let Some(count) = declared_count(bytes) else {
            return Self::new();
        };

        let items = bytes[COUNT_LEN..]
            .chunks_exact(ITEM_LEN)
            .take(count as usize)
            .map(|chunk| PrivilegeItem {
                privilege: u16::from_be_bytes([chunk[0], chunk[1]]),
                expire_ts: u32::from_be_bytes([chunk[2], chunk[3], chunk[4], chunk[5]]),
            })
            .collect();

        Self { items }
    }
}

impl FromIterator<(u16, u32)> for PrivilegeMessage {
    fn from_iter<T: IntoIterator<Item = (u16, u32)>>(iter: T) -> Self {
        let mut message = Self::new();
        for (privilege, expire_ts) in iter {
            message.insert(privilege, expire_ts);
        }
        message
    }
}

/// The entry count announced by the message prefix, if the prefix is present.
pub fn declared_count(bytes: &[u8]) -> Option<u16> {
    match bytes {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}
