//! At-rest encryption of personal settings files.
//!
//! An encrypted file is an 8-byte magic header followed by a JSON envelope:
//!
//! ```text
//! PSETENC1{"version":1,"nonce":[..24 bytes..],"ciphertext":[..]}
//! ```
//!
//! The ciphertext is the whole TOML document sealed with XChaCha20-Poly1305
//! under the profile's passkey.  A fresh random nonce is drawn for every save.
//! Poly1305 authentication means a wrong passkey and a damaged file are
//! indistinguishable: both fail to decrypt.
//!
//! Passkeys are derived from passwords with PBKDF2-HMAC-SHA256.

use chacha20poly1305::aead::Aead;
use chacha20poly1305::{Key, KeyInit, XChaCha20Poly1305, XNonce};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use settings_core::Passkey;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Header identifying an encrypted settings file.
pub const MAGIC: &[u8; 8] = b"PSETENC1";

/// Envelope format version.
const VERSION: u8 = 1;

const XNONCE_SIZE: usize = 24;

/// PBKDF2 iterations used for password-derived passkeys.
pub const KDF_ROUNDS: u32 = 100_000;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("malformed envelope: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("unsupported envelope version: expected {0}, got {1}")]
    Version(u8, u8),

    #[error(transparent)]
    Encryption(#[from] chacha20poly1305::aead::Error),

    #[error("key derivation failed")]
    KeyDerivation,

    #[error("data is not encrypted")]
    NotEncrypted,
}

#[derive(Debug, Serialize, Deserialize)]
struct EncryptedDocument {
    version: u8,
    nonce: [u8; XNONCE_SIZE],
    ciphertext: Vec<u8>,
}

/// Whether `bytes` start with the encrypted-file header.
pub fn is_encrypted(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

/// Seals `plaintext` under `passkey`.
///
/// # Errors
///
/// Returns [`CipherError::Encryption`] if the AEAD refuses the input, or
/// [`CipherError::Serde`] if the envelope cannot be serialized.
pub fn encrypt(passkey: &Passkey, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut nonce = [0u8; XNONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);

    let cipher = XChaCha20Poly1305::new(Key::from_slice(passkey.as_bytes()));
    let ciphertext = cipher.encrypt(XNonce::from_slice(&nonce), plaintext)?;

    let envelope = EncryptedDocument {
        version: VERSION,
        nonce,
        ciphertext,
    };
    let mut out = MAGIC.to_vec();
    serde_json::to_writer(&mut out, &envelope)?;
    Ok(out)
}

/// Opens an encrypted file's bytes with `passkey`.
///
/// The plaintext is zeroed when the returned buffer is dropped.
///
/// # Errors
///
/// - [`CipherError::NotEncrypted`] if the header is missing.
/// - [`CipherError::Serde`] / [`CipherError::Version`] for a bad envelope.
/// - [`CipherError::Encryption`] for a wrong passkey or tampered data.
pub fn decrypt(passkey: &Passkey, bytes: &[u8]) -> Result<Zeroizing<Vec<u8>>, CipherError> {
    let body = bytes.strip_prefix(MAGIC).ok_or(CipherError::NotEncrypted)?;
    let envelope: EncryptedDocument = serde_json::from_slice(body)?;
    if envelope.version != VERSION {
        return Err(CipherError::Version(VERSION, envelope.version));
    }

    let cipher = XChaCha20Poly1305::new(Key::from_slice(passkey.as_bytes()));
    let plaintext = cipher.decrypt(XNonce::from_slice(&envelope.nonce), &*envelope.ciphertext)?;
    Ok(Zeroizing::new(plaintext))
}

/// Derives a passkey from `password` with [`KDF_ROUNDS`] iterations.
///
/// # Errors
///
/// Returns [`CipherError::KeyDerivation`] if PBKDF2 rejects the output length.
pub fn derive_passkey(password: &str, salt: &[u8]) -> Result<Passkey, CipherError> {
    derive_passkey_with_rounds(password, salt, KDF_ROUNDS)
}

/// Like [`derive_passkey`] with an explicit iteration count.
pub fn derive_passkey_with_rounds(
    password: &str,
    salt: &[u8],
    rounds: u32,
) -> Result<Passkey, CipherError> {
    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, rounds, key.as_mut_slice())
        .map_err(|_| CipherError::KeyDerivation)?;
    Ok(Passkey::from_bytes(*key))
}
