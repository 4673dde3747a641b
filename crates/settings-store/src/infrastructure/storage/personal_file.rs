//! Per-profile settings files, `<profile>.ini`.
//!
//! A profile without a file of its own reads the global file instead: older
//! installations kept everything in one file.  Unrelated sections in that
//! file are ignored.
//!
//! With a passkey the whole TOML document is encrypted (see
//! [`cipher`](super::cipher)).  A clear-text file is still accepted when a
//! passkey is supplied, so an unencrypted profile is encrypted by its next
//! save.

use std::path::{Path, PathBuf};

use settings_core::{Passkey, PersonalDocument};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::cipher::{self, CipherError};
use super::global_file::global_path;
use super::{read_optional, remove_file, write_file};
use crate::application::ports::StorageError;

/// Extension of personal settings files.
pub const PERSONAL_EXTENSION: &str = "ini";

pub fn personal_path(dir: &Path, profile: &str) -> PathBuf {
    dir.join(format!("{profile}.{PERSONAL_EXTENSION}"))
}

/// Reads the personal document of `profile` from `dir`.
///
/// Falls back to the global file, then to an empty document.
///
/// # Errors
///
/// - [`StorageError::PasskeyRequired`] for an encrypted file and no passkey.
/// - [`StorageError::Decrypt`] when the passkey does not open the file.
/// - [`StorageError::Decode`] for malformed content.
/// - [`StorageError::Io`] for other file-system failures.
pub fn read_personal(
    dir: &Path,
    profile: &str,
    passkey: Option<&Passkey>,
) -> Result<PersonalDocument, StorageError> {
    let own = personal_path(dir, profile);
    let (path, bytes) = match read_optional(&own)? {
        Some(bytes) => (own, bytes),
        None => {
            let legacy = global_path(dir);
            match read_optional(&legacy)? {
                Some(bytes) => {
                    debug!(profile, path = %legacy.display(), "no personal file, reading global file");
                    (legacy, bytes)
                }
                None => {
                    debug!(profile, "no personal settings on disk, using defaults");
                    return Ok(PersonalDocument::default());
                }
            }
        }
    };

    let plaintext = if cipher::is_encrypted(&bytes) {
        let passkey = passkey.ok_or_else(|| StorageError::PasskeyRequired { path: path.clone() })?;
        cipher::decrypt(passkey, &bytes).map_err(|e| match e {
            CipherError::Encryption(_) => StorageError::Decrypt { path: path.clone() },
            other => StorageError::Decode {
                path: path.clone(),
                reason: other.to_string(),
            },
        })?
    } else {
        if passkey.is_some() {
            warn!(profile, path = %path.display(), "personal file is not encrypted; it will be on next save");
        }
        Zeroizing::new(bytes)
    };

    let text = std::str::from_utf8(&plaintext).map_err(|e| StorageError::Decode {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    PersonalDocument::from_toml(text).map_err(|e| StorageError::Decode {
        path,
        reason: e.to_string(),
    })
}

/// Replaces `<profile>.ini` in `dir`.  Encrypted when `passkey` is given.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if serialization or encryption fails and
/// [`StorageError::Io`] if the file cannot be written.
pub fn write_personal(
    dir: &Path,
    profile: &str,
    passkey: Option<&Passkey>,
    document: &PersonalDocument,
) -> Result<(), StorageError> {
    let text = Zeroizing::new(
        toml::to_string_pretty(document).map_err(|e| StorageError::Encode(e.to_string()))?,
    );
    let path = personal_path(dir, profile);
    match passkey {
        Some(passkey) => {
            let sealed = cipher::encrypt(passkey, text.as_bytes())
                .map_err(|e| StorageError::Encode(e.to_string()))?;
            write_file(&path, &sealed)
        }
        None => write_file(&path, text.as_bytes()),
    }
}

/// Deletes `<profile>.ini` from `dir`.
pub fn remove_personal(dir: &Path, profile: &str) -> Result<(), StorageError> {
    remove_file(&personal_path(dir, profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use settings_core::{PersonalSettings, PublicKey};
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("settings-personal-{}", Uuid::new_v4()))
    }

    fn sample_document() -> PersonalDocument {
        let mut settings = PersonalSettings::default();
        let key = PublicKey::from_bytes([0x11; 32]);
        settings.contacts.get_or_insert(key).alias = "Alice".to_string();
        settings.circles.add("Work");
        settings.requests.add("ADDR", "hello");
        settings.to_document()
    }

    #[test]
    fn test_missing_files_give_default_document() {
        let dir = temp_dir();
        let doc = read_personal(&dir, "nobody", None).unwrap();
        assert_eq!(doc, PersonalDocument::default());
    }

    #[test]
    fn test_clear_text_round_trip() {
        // Arrange
        let dir = temp_dir();
        let doc = sample_document();

        // Act
        write_personal(&dir, "alice", None, &doc).unwrap();
        let restored = read_personal(&dir, "alice", None).unwrap();

        // Assert
        assert_eq!(restored, doc);
        let raw = std::fs::read_to_string(personal_path(&dir, "alice")).unwrap();
        assert!(raw.contains("Alice"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_encrypted_round_trip_and_failures() {
        // Arrange
        let dir = temp_dir();
        let doc = sample_document();
        let passkey = Passkey::from_bytes([5; 32]);

        // Act
        write_personal(&dir, "alice", Some(&passkey), &doc).unwrap();

        // Assert
        let raw = std::fs::read(personal_path(&dir, "alice")).unwrap();
        assert!(cipher::is_encrypted(&raw));
        assert_eq!(read_personal(&dir, "alice", Some(&passkey)).unwrap(), doc);
        assert!(matches!(
            read_personal(&dir, "alice", None),
            Err(StorageError::PasskeyRequired { .. })
        ));
        assert!(matches!(
            read_personal(&dir, "alice", Some(&Passkey::from_bytes([6; 32]))),
            Err(StorageError::Decrypt { .. })
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_clear_text_file_accepted_with_passkey() {
        let dir = temp_dir();
        let doc = sample_document();
        write_personal(&dir, "alice", None, &doc).unwrap();

        let restored = read_personal(&dir, "alice", Some(&Passkey::from_bytes([1; 32]))).unwrap();

        assert_eq!(restored, doc);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_falls_back_to_global_file() {
        // Arrange: a single-file layout with personal sections in settings.ini.
        let dir = temp_dir();
        let legacy = "[General]\ntranslation = \"de\"\n\n[Proxy]\nproxyType = 2\nproxyAddr = \"proxy.local\"\nproxyPort = 8080\n";
        write_file(&global_path(&dir), legacy.as_bytes()).unwrap();

        // Act
        let doc = read_personal(&dir, "alice", None).unwrap();

        // Assert
        assert_eq!(doc.proxy.proxy_addr, "proxy.local");
        assert_eq!(doc.proxy.proxy_port, 8080);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = temp_dir();
        write_personal(&dir, "alice", None, &PersonalDocument::default()).unwrap();

        remove_personal(&dir, "alice").unwrap();

        assert!(!personal_path(&dir, "alice").exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
