//! A profile backed by a local password.
//!
//! The passkey is derived once, when the profile is opened, with
//! PBKDF2-HMAC-SHA256.  The salt is the SHA-256 digest of the profile name, so
//! the same name and password always yield the same passkey and the salt never
//! has to be stored.

use settings_core::Passkey;
use sha2::{Digest, Sha256};

use super::storage::cipher::{self, CipherError};
use crate::application::ports::Profile;

#[derive(Debug, Clone)]
pub struct LocalProfile {
    name: String,
    passkey: Option<Passkey>,
}

impl LocalProfile {
    /// A profile whose personal file is stored in clear text.
    pub fn unencrypted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passkey: None,
        }
    }

    /// A profile whose personal file is encrypted with a key derived from
    /// `password`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::KeyDerivation`] if the key cannot be derived.
    pub fn with_password(name: impl Into<String>, password: &str) -> Result<Self, CipherError> {
        let name = name.into();
        let passkey = cipher::derive_passkey(password, &name_salt(&name))?;
        Ok(Self {
            name,
            passkey: Some(passkey),
        })
    }

    /// A profile using an already derived passkey.
    pub fn with_passkey(name: impl Into<String>, passkey: Passkey) -> Self {
        Self {
            name: name.into(),
            passkey: Some(passkey),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.passkey.is_some()
    }
}

impl Profile for LocalProfile {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn passkey(&self) -> Option<Passkey> {
        self.passkey.clone()
    }
}

fn name_salt(name: &str) -> [u8; 32] {
    Sha256::digest(name.as_bytes()).into()
}
