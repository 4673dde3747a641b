//! Traits the settings store depends on, implemented by the infrastructure
//! layer.
//!
//! - [`SettingsRepository`] reads and writes the global and personal files.
//! - [`Profile`] is the active identity: its name selects the personal file
//!   and its passkey (if any) encrypts it.

use std::path::{Path, PathBuf};

use settings_core::{GlobalSettings, Passkey, PersonalDocument};
use thiserror::Error;

/// Errors raised by a [`SettingsRepository`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but its content could not be parsed.
    #[error("failed to parse settings at {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// The settings could not be serialized.
    #[error("failed to serialize settings: {0}")]
    Encode(String),

    /// The file is encrypted and no passkey was supplied.
    #[error("{path} is encrypted and no passkey was supplied")]
    PasskeyRequired { path: PathBuf },

    /// Decryption failed: wrong passkey or a damaged file.
    #[error("could not decrypt {path}: wrong passkey or damaged file")]
    Decrypt { path: PathBuf },
}

/// Persistence of the two settings tiers.
///
/// Every method takes the settings directory explicitly because the store
/// decides it at runtime (portable mode moves it next to the executable).
pub trait SettingsRepository: Send + Sync {
    /// Reads the global file in `dir`.  `Ok(None)` when it does not exist.
    fn load_global(&self, dir: &Path) -> Result<Option<GlobalSettings>, StorageError>;

    /// Replaces the global file in `dir`, creating the directory if needed.
    fn save_global(&self, dir: &Path, settings: &GlobalSettings) -> Result<(), StorageError>;

    /// Deletes the global file in `dir`.  Missing files are not an error.
    fn remove_global(&self, dir: &Path) -> Result<(), StorageError>;

    /// Settings used on first run, when no global file exists yet.
    fn bundled_global(&self) -> GlobalSettings {
        GlobalSettings::default()
    }

    /// Reads the personal document of `profile`.
    ///
    /// Implementations fall back to the global file when the profile has no
    /// file of its own, and return an empty document when neither exists.
    fn load_personal(
        &self,
        dir: &Path,
        profile: &str,
        passkey: Option<&Passkey>,
    ) -> Result<PersonalDocument, StorageError>;

    /// Replaces the personal file of `profile`; encrypted when `passkey` is
    /// given, clear text otherwise.
    fn save_personal(
        &self,
        dir: &Path,
        profile: &str,
        passkey: Option<&Passkey>,
        document: &PersonalDocument,
    ) -> Result<(), StorageError>;

    /// Deletes the personal file of `profile`.  Missing files are not an error.
    fn remove_personal(&self, dir: &Path, profile: &str) -> Result<(), StorageError>;
}

/// The identity whose personal settings are active.
#[cfg_attr(test, mockall::automock)]
pub trait Profile {
    /// Profile name; selects `<name>.ini`.
    fn name(&self) -> String;

    /// Encryption key for the personal file, `None` for clear text.
    fn passkey(&self) -> Option<Passkey>;
}

/// Where settings files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsLocation {
    /// Per-user settings directory.
    pub user_dir: PathBuf,
    /// Directory of the executable, used in portable mode.  `None` disables
    /// portable mode detection.
    pub portable_dir: Option<PathBuf>,
}

impl SettingsLocation {
    /// A location with a fixed directory and no portable mode.
    pub fn fixed(dir: impl Into<PathBuf>) -> Self {
        Self {
            user_dir: dir.into(),
            portable_dir: None,
        }
    }

    /// The directory to use given the current portable flag.
    pub fn dir(&self, portable: bool) -> &Path {
        match (&self.portable_dir, portable) {
            (Some(dir), true) => dir,
            _ => &self.user_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_location_ignores_portable_flag() {
        let location = SettingsLocation::fixed("/tmp/settings");
        assert_eq!(location.dir(false), Path::new("/tmp/settings"));
        assert_eq!(location.dir(true), Path::new("/tmp/settings"));
    }

    #[test]
    fn test_portable_flag_selects_portable_dir() {
        let location = SettingsLocation {
            user_dir: PathBuf::from("/home/u/.config/profile-settings"),
            portable_dir: Some(PathBuf::from("/opt/app")),
        };
        assert_eq!(location.dir(true), Path::new("/opt/app"));
        assert_eq!(
            location.dir(false),
            Path::new("/home/u/.config/profile-settings")
        );
    }

    #[test]
    fn test_mock_profile_returns_configured_values() {
        let mut profile = MockProfile::new();
        profile.expect_name().return_const("alice".to_string());
        profile.expect_passkey().returning(|| None);

        assert_eq!(profile.name(), "alice");
        assert!(profile.passkey().is_none());
    }
}
