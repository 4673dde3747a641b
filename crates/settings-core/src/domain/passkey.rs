//! Encryption key for a profile's personal file.
//!
//! A `Passkey` is derived from the profile password by the infrastructure
//! layer and handed to the store on every load and save.  The store never
//! writes it anywhere.  The bytes are wiped when the value is dropped and are
//! never printed by `Debug`.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of a passkey in bytes.
pub const PASSKEY_SIZE: usize = 32;

/// Opaque 256-bit key used to encrypt a personal settings file at rest.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Passkey([u8; PASSKEY_SIZE]);

impl Passkey {
    pub fn from_bytes(bytes: [u8; PASSKEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PASSKEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for Passkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passkey(<redacted>)")
    }
}
