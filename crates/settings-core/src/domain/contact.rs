//! Contact records and the keyed store that holds them.
//!
//! Every contact is identified by its 32-byte public key.  The address a user
//! shares is longer than the key: 64 hex characters of key material followed
//! by a 4-byte nospam value and a 2-byte checksum (76 hex characters in
//! total).  Only the leading 64 characters identify the contact; the suffix
//! can change without the contact changing.
//!
//! # Lazy creation
//!
//! [`ContactStore::get_or_insert`] is the single insertion path used by every
//! per-contact setter.  Writing any one field of an unknown contact therefore
//! materializes a full record with every other field at its default.
//! [`ContactStore::find`] never creates anything.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of a public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Number of hex characters encoding a public key.
pub const PUBLIC_KEY_HEX_LEN: usize = PUBLIC_KEY_SIZE * 2;

/// Number of hex characters in a full address (key + nospam + checksum).
pub const ADDRESS_HEX_LEN: usize = 76;

/// Errors produced when deriving a [`PublicKey`] from text.
#[derive(Debug, Error, PartialEq)]
pub enum KeyError {
    /// The input is shorter than the hex form of a public key.
    #[error("address is {len} characters long, at least {PUBLIC_KEY_HEX_LEN} are required")]
    TooShort { len: usize },

    /// The leading characters are not valid hex.
    #[error("address does not start with a hex encoded public key: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

// ── PublicKey ─────────────────────────────────────────────────────────────────

/// A contact's public key.  Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Derives the key from an address or a bare hex key.
    ///
    /// Only the first [`PUBLIC_KEY_HEX_LEN`] characters are decoded; anything
    /// after them (nospam, checksum) is ignored.  Hex case does not matter.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::TooShort`] if the input cannot hold a key and
    /// [`KeyError::InvalidHex`] if the key part is not hex.
    pub fn from_address(address: &str) -> Result<Self, KeyError> {
        let raw = address.trim().as_bytes();
        if raw.len() < PUBLIC_KEY_HEX_LEN {
            return Err(KeyError::TooShort { len: raw.len() });
        }
        let mut bytes = [0u8; PUBLIC_KEY_SIZE];
        hex::decode_to_slice(&raw[..PUBLIC_KEY_HEX_LEN], &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Uppercase hex form, the canonical textual representation.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_address(s)
    }
}

// ── AutoAcceptCall ────────────────────────────────────────────────────────────

/// Bit set of call types accepted without asking.
///
/// Stored as a plain integer in the personal file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutoAcceptCall(pub u8);

impl AutoAcceptCall {
    pub const NONE: u8 = 0;
    pub const AUDIO: u8 = 1 << 0;
    pub const VIDEO: u8 = 1 << 1;

    /// Returns `true` if audio calls are auto-accepted.
    pub fn audio(&self) -> bool {
        self.0 & Self::AUDIO != 0
    }

    /// Returns `true` if video calls are auto-accepted.
    pub fn video(&self) -> bool {
        self.0 & Self::VIDEO != 0
    }
}

// ── ContactRecord ─────────────────────────────────────────────────────────────

/// Per-contact settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRecord {
    key: PublicKey,
    /// Full address as last seen, or the hex key when the address is unknown.
    pub address: String,
    pub alias: String,
    pub note: String,
    /// Directory incoming files from this contact are saved to without asking.
    /// Empty means "ask".
    pub auto_accept_dir: String,
    pub auto_accept_call: AutoAcceptCall,
    pub auto_group_invite: bool,
    /// Index into the circle list.  Not stable across circle removals.
    pub circle: Option<usize>,
    pub activity: Option<DateTime<Utc>>,
}

impl ContactRecord {
    /// Creates a default record for `key` whose address is the key's hex form.
    pub fn new(key: PublicKey) -> Self {
        Self {
            key,
            address: key.to_hex(),
            alias: String::new(),
            note: String::new(),
            auto_accept_dir: String::new(),
            auto_accept_call: AutoAcceptCall::default(),
            auto_group_invite: false,
            circle: None,
            activity: None,
        }
    }

    pub fn key(&self) -> &PublicKey {
        &self.key
    }
}

// ── ContactStore ──────────────────────────────────────────────────────────────

/// In-memory map from public key to contact record.
///
/// Iteration order is unspecified.  Callers that need a stable order must
/// sort the snapshot themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactStore {
    records: HashMap<PublicKey, ContactRecord>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a record without creating one.
    pub fn find(&self, key: &PublicKey) -> Option<&ContactRecord> {
        self.records.get(key)
    }

    /// Returns the record for `key`, creating a default one if absent.
    pub fn get_or_insert(&mut self, key: PublicKey) -> &mut ContactRecord {
        self.records
            .entry(key)
            .or_insert_with(|| ContactRecord::new(key))
    }

    /// Inserts `record`, replacing any record with the same key.
    pub fn insert(&mut self, record: ContactRecord) -> Option<ContactRecord> {
        self.records.insert(record.key, record)
    }

    /// Removes the record for `key` entirely.
    pub fn remove(&mut self, key: &PublicKey) -> Option<ContactRecord> {
        self.records.remove(key)
    }

    /// Stores `address` on the contact it identifies, creating the contact if
    /// needed.  Returns the derived key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if no key can be derived from `address`.
    pub fn update_address(&mut self, address: &str) -> Result<PublicKey, KeyError> {
        let key = PublicKey::from_address(address)?;
        self.get_or_insert(key).address = address.trim().to_string();
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactRecord> {
        self.records.values()
    }

    /// Clears every contact's circle membership that points at `index`.
    pub fn clear_circle(&mut self, index: usize) {
        for record in self.records.values_mut() {
            if record.circle == Some(index) {
                record.circle = None;
            }
        }
    }

    /// Rewrites circle membership `from` to `to` on every contact.
    pub fn move_circle(&mut self, from: usize, to: usize) {
        for record in self.records.values_mut() {
            if record.circle == Some(from) {
                record.circle = Some(to);
            }
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
