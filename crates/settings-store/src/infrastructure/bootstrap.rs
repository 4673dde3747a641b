//! Builds a [`SettingsStore`] backed by settings files on disk.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::storage::location::{resolve_location, LocationError};
use super::storage::repository::FileRepository;
use crate::application::store::{SettingsStore, StoreError};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Opens the settings store for `dir_override`, or the platform directory.
///
/// The global settings are loaded before this returns.
///
/// # Errors
///
/// Returns [`BootstrapError::Location`] if no settings directory can be found
/// and [`BootstrapError::Store`] if the worker thread cannot be started.
pub fn open_store(dir_override: Option<PathBuf>) -> Result<SettingsStore, BootstrapError> {
    let location = resolve_location(dir_override)?;
    let store = SettingsStore::new(Arc::new(FileRepository::new()), location)?;
    info!(
        dir = %store.settings_dir().display(),
        portable = store.make_portable(),
        "settings store ready"
    );
    Ok(store)
}
