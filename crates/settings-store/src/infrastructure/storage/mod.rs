//! Storage infrastructure: settings file persistence.
//!
//! - `location` finds the settings directory for the platform, and the
//!   executable directory used in portable mode.
//! - `global_file` reads and writes `settings.ini`.
//! - `personal_file` reads and writes `<profile>.ini`, encrypted or not.
//! - `cipher` is the at-rest encryption used by `personal_file`.
//! - `repository` ties them together behind the `SettingsRepository` port.
//!
//! All files are TOML.  Every write replaces the whole file.

pub mod cipher;
pub mod global_file;
pub mod location;
pub mod personal_file;
pub mod repository;

use std::io;
use std::path::Path;

use crate::application::ports::StorageError;

/// Reads a file, mapping "not found" to `Ok(None)`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `bytes` to `path`, creating the parent directory first.
pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Deletes `path`.  A missing file is not an error.
pub(crate) fn remove_file(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
