//! The global settings file, `settings.ini`.
//!
//! Always clear text.  A missing file is not an error: the caller falls back
//! to [`bundled_defaults`], the default document compiled into the binary.

use std::path::{Path, PathBuf};

use settings_core::GlobalSettings;
use tracing::{debug, warn};

use super::{read_optional, remove_file, write_file};
use crate::application::ports::StorageError;

/// File name of the global settings file inside the settings directory.
pub const GLOBAL_SETTINGS_FILE: &str = "settings.ini";

const BUNDLED_DEFAULTS: &str = include_str!("../../../resources/default_settings.ini");

pub fn global_path(dir: &Path) -> PathBuf {
    dir.join(GLOBAL_SETTINGS_FILE)
}

/// Reads `settings.ini` from `dir`.  `Ok(None)` if it does not exist.
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system errors other than "not found"
/// and [`StorageError::Decode`] if the file is not TOML.  Values that do not
/// fit the schema only reset their own key.
pub fn read_global(dir: &Path) -> Result<Option<GlobalSettings>, StorageError> {
    let path = global_path(dir);
    let Some(bytes) = read_optional(&path)? else {
        return Ok(None);
    };
    let text = String::from_utf8_lossy(&bytes);
    let settings = GlobalSettings::from_toml(&text).map_err(|e| StorageError::Decode {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "read global settings file");
    Ok(Some(settings))
}

/// Replaces `settings.ini` in `dir` with `settings`.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if serialization fails and
/// [`StorageError::Io`] if the directory or file cannot be written.
pub fn write_global(dir: &Path, settings: &GlobalSettings) -> Result<(), StorageError> {
    let text =
        toml::to_string_pretty(settings).map_err(|e| StorageError::Encode(e.to_string()))?;
    write_file(&global_path(dir), text.as_bytes())
}

/// Deletes `settings.ini` from `dir`.
pub fn remove_global(dir: &Path) -> Result<(), StorageError> {
    remove_file(&global_path(dir))
}

/// The default global settings shipped with the binary.
pub fn bundled_defaults() -> GlobalSettings {
    match GlobalSettings::from_toml(BUNDLED_DEFAULTS) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("bundled default settings are malformed, using built-in defaults: {e}");
            GlobalSettings::default()
        }
    }
}
