//! File-backed implementation of the repository port.

use std::path::Path;

use settings_core::{GlobalSettings, Passkey, PersonalDocument};

use super::{global_file, personal_file};
use crate::application::ports::{SettingsRepository, StorageError};

/// Reads and writes settings files in the directory the store passes in.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileRepository;

impl FileRepository {
    pub fn new() -> Self {
        Self
    }
}

impl SettingsRepository for FileRepository {
    fn load_global(&self, dir: &Path) -> Result<Option<GlobalSettings>, StorageError> {
        global_file::read_global(dir)
    }

    fn save_global(&self, dir: &Path, settings: &GlobalSettings) -> Result<(), StorageError> {
        global_file::write_global(dir, settings)
    }

    fn remove_global(&self, dir: &Path) -> Result<(), StorageError> {
        global_file::remove_global(dir)
    }

    fn bundled_global(&self) -> GlobalSettings {
        global_file::bundled_defaults()
    }

    fn load_personal(
        &self,
        dir: &Path,
        profile: &str,
        passkey: Option<&Passkey>,
    ) -> Result<PersonalDocument, StorageError> {
        personal_file::read_personal(dir, profile, passkey)
    }

    fn save_personal(
        &self,
        dir: &Path,
        profile: &str,
        passkey: Option<&Passkey>,
        document: &PersonalDocument,
    ) -> Result<(), StorageError> {
        personal_file::write_personal(dir, profile, passkey, document)
    }

    fn remove_personal(&self, dir: &Path, profile: &str) -> Result<(), StorageError> {
        personal_file::remove_personal(dir, profile)
    }
}
