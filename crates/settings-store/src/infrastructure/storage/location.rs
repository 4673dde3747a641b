//! Settings directory resolution.
//!
//! The per-user directory is:
//! - Windows:  `%APPDATA%\ProfileSettings`
//! - Linux:    `$XDG_CONFIG_HOME/profile-settings` or `~/.config/profile-settings`
//! - macOS:    `~/Library/Application Support/ProfileSettings`
//!
//! The executable's directory is offered as the portable directory.  Whether
//! it is actually used is decided by the store when it reads the global file
//! found there.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::application::ports::SettingsLocation;

/// Error type for directory resolution.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,
}

/// Resolves where settings live.
///
/// With `dir_override` the given directory is used as is and portable mode
/// detection is disabled.
///
/// # Errors
///
/// Returns [`LocationError::NoPlatformConfigDir`] when no override is given and
/// the platform base directory cannot be determined from the environment.
pub fn resolve_location(dir_override: Option<PathBuf>) -> Result<SettingsLocation, LocationError> {
    if let Some(dir) = dir_override {
        debug!(dir = %dir.display(), "using settings directory override");
        return Ok(SettingsLocation::fixed(dir));
    }
    let user_dir = platform_config_dir().ok_or(LocationError::NoPlatformConfigDir)?;
    let portable_dir = executable_dir();
    debug!(
        user_dir = %user_dir.display(),
        portable_dir = ?portable_dir,
        "resolved settings directories"
    );
    Ok(SettingsLocation {
        user_dir,
        portable_dir,
    })
}

/// Directory containing the running executable, if it can be determined.
fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
}

/// Resolves the platform settings directory including the application
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("ProfileSettings"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("profile-settings"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("ProfileSettings")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}
