//! The settings façade: owner of all in-memory settings state.
//!
//! [`SettingsStore`] holds the global settings, the personal settings of the
//! active profile and the bookkeeping that decides when either may be
//! written.  It is `Send + Sync`; share it behind an `Arc`.
//!
//! # Locking contract
//!
//! All state lives in one `Mutex<StoreState>`.  Rust mutexes are not
//! re-entrant, so the store follows two rules:
//!
//! 1. Every public method acquires the lock at most once at a time.  Helpers
//!    that need the state take `&mut StoreState` instead of locking again.
//!    Composite operations (profile switch, portable toggle) release the lock
//!    before calling the next public step.
//! 2. Change events are collected under the lock and delivered after it is
//!    released (see [`SettingsStore::mutate`]), so listeners may call back
//!    into the store.
//!
//! File I/O from caller threads (loads, reset) happens without the lock held.
//! Writes run on the worker thread and do hold the lock, so the snapshot they
//! write is consistent with concurrent setters.
//!
//! A poisoned lock (a panicking listener or job) is recovered rather than
//! propagated.
//!
//! # Persistence flow (for beginners)
//!
//! ```text
//! caller thread                       worker thread ("settings-io")
//! ─────────────                       ────────────────────────────
//! set_alias(..)   lock → mutate → unlock → emit events
//! save_personal() ── job ─────────▶   lock → to_document → write file → unlock
//! sync()          ── marker ──────▶   ack once every earlier job has run
//! ```
//!
//! Setters change memory immediately.  The file reflects the change only once
//! the queued save job has run; call [`SettingsStore::sync`] to wait for it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use settings_core::{
    profile_id, GlobalSettings, Passkey, PersonalDocument, PersonalSettings,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::dispatcher::Dispatcher;
use super::events::{EventBus, SettingsEvent};
use super::ports::{Profile, SettingsLocation, SettingsRepository, StorageError};

/// Name of the worker thread that performs all writes.
pub const WORKER_THREAD_NAME: &str = "settings-io";

/// Errors reported by the store.
///
/// Loads and saves never fail the caller: they degrade to defaults or skip
/// the write and log.  These errors cover caller-contract violations and
/// explicitly fallible operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A profile switch was requested without a profile.
    #[error("no active profile")]
    NoActiveProfile,

    /// A circle index does not exist.
    #[error("circle index {index} out of range (count {count})")]
    CircleOutOfRange { index: usize, count: usize },

    /// A pending request index does not exist.
    #[error("friend request index {index} out of range (count {count})")]
    RequestOutOfRange { index: usize, count: usize },

    /// No contact key can be derived from the address.
    #[error("invalid contact address: {0}")]
    InvalidAddress(#[from] settings_core::KeyError),

    /// The worker thread could not be started.
    #[error("failed to start settings worker: {0}")]
    Worker(#[source] std::io::Error),

    /// A synchronous storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// ── State ─────────────────────────────────────────────────────────────────────

/// The profile installed by the last profile switch.  Memory only.
#[derive(Debug, Clone)]
pub(crate) struct ActiveProfile {
    pub(crate) name: String,
    pub(crate) passkey: Option<Passkey>,
}

/// Everything guarded by the store lock.
#[derive(Debug)]
pub(crate) struct StoreState {
    /// Set once the global file has been applied; gates every save.
    pub(crate) loaded: bool,
    pub(crate) current_profile_id: u32,
    pub(crate) active: Option<ActiveProfile>,
    /// Profile whose personal file exists but could not be read.  Its saves
    /// are refused so the defaults shown in its place never overwrite it.
    pub(crate) unreadable_personal: Option<String>,
    pub(crate) global: GlobalSettings,
    pub(crate) personal: PersonalSettings,
}

impl StoreState {
    fn new() -> Self {
        Self {
            loaded: false,
            current_profile_id: profile_id(""),
            active: None,
            unreadable_personal: None,
            global: GlobalSettings::default(),
            personal: PersonalSettings::default(),
        }
    }

    /// Sets the current profile name and its id, queuing one event for each.
    pub(crate) fn set_current_profile(&mut self, name: &str, events: &mut Vec<SettingsEvent>) {
        if self.global.general.current_profile == name {
            return;
        }
        self.global.general.current_profile = name.to_string();
        self.current_profile_id = profile_id(name);
        events.push(SettingsEvent::CurrentProfileChanged(name.to_string()));
        events.push(SettingsEvent::CurrentProfileIdChanged(self.current_profile_id));
    }
}

/// State shared between the façade and the jobs it queues.
pub(crate) struct Shared {
    state: Mutex<StoreState>,
    pub(crate) events: EventBus,
    pub(crate) repo: Arc<dyn SettingsRepository>,
    pub(crate) location: SettingsLocation,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes the global file.  Runs on the worker.
    fn write_global(&self) {
        let st = self.lock();
        if !st.loaded {
            debug!("skipping global settings save: settings not loaded");
            return;
        }
        let dir = self.location.dir(st.global.advanced.make_portable);
        info!(dir = %dir.display(), "saving global settings");
        if let Err(e) = self.repo.save_global(dir, &st.global) {
            error!("failed to save global settings: {e}");
        }
    }

    /// Writes the personal file of `profile`.  Runs on the worker.
    fn write_personal(&self, profile: &str, passkey: Option<&Passkey>) {
        if profile.is_empty() {
            debug!("skipping personal settings save: empty profile name");
            return;
        }
        let st = self.lock();
        if !st.loaded {
            debug!(profile, "skipping personal settings save: settings not loaded");
            return;
        }
        if st.unreadable_personal.as_deref() == Some(profile) {
            warn!(profile, "skipping personal settings save: the file on disk could not be read");
            return;
        }
        let dir = self.location.dir(st.global.advanced.make_portable);
        let document = st.personal.to_document();
        info!(
            profile,
            dir = %dir.display(),
            encrypted = passkey.is_some(),
            "saving personal settings"
        );
        if let Err(e) = self.repo.save_personal(dir, profile, passkey, &document) {
            error!(profile, "failed to save personal settings: {e}");
        }
    }
}

// ── SettingsStore ─────────────────────────────────────────────────────────────

/// Thread-safe owner of the global and personal settings.
pub struct SettingsStore {
    pub(crate) shared: Arc<Shared>,
    pub(crate) dispatcher: Dispatcher,
}

impl SettingsStore {
    /// Starts the worker thread and loads the global settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Worker`] if the worker thread cannot be spawned.
    pub fn new(
        repo: Arc<dyn SettingsRepository>,
        location: SettingsLocation,
    ) -> Result<Self, StoreError> {
        let dispatcher = Dispatcher::spawn(WORKER_THREAD_NAME).map_err(StoreError::Worker)?;
        let store = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState::new()),
                events: EventBus::new(),
                repo,
                location,
            }),
            dispatcher,
        };
        store.load_global();
        Ok(store)
    }

    // ── Internal access helpers ──────────────────────────────────────────────

    /// Runs `f` with shared access to the state.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        let st = self.shared.lock();
        f(&st)
    }

    /// Runs `f` with exclusive access to the state, then emits the events it
    /// collected once the lock has been released.
    pub(crate) fn mutate<R>(
        &self,
        f: impl FnOnce(&mut StoreState, &mut Vec<SettingsEvent>) -> R,
    ) -> R {
        let mut events = Vec::new();
        let result = {
            let mut st = self.shared.lock();
            f(&mut st, &mut events)
        };
        for event in &events {
            self.shared.events.emit(event);
        }
        result
    }

    /// Directory the settings currently live in.
    pub fn settings_dir(&self) -> PathBuf {
        let portable = self.read(|st| st.global.advanced.make_portable);
        self.shared.location.dir(portable).to_path_buf()
    }

    // ── Events ───────────────────────────────────────────────────────────────

    /// Registers a listener for every future change.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&SettingsEvent) + Send + Sync + 'static,
    {
        self.shared.events.subscribe(listener);
    }

    /// Returns a channel receiving every future change.
    pub fn events(&self) -> tokio::sync::mpsc::UnboundedReceiver<SettingsEvent> {
        self.shared.events.channel()
    }

    // ── Load ─────────────────────────────────────────────────────────────────

    /// Loads the global settings.  Does nothing if they are already loaded.
    ///
    /// A missing file yields the bundled defaults; an unreadable one yields
    /// the bundled defaults and a warning.  The stored current profile is
    /// only adopted when none has been set in memory.
    pub fn load_global(&self) {
        if self.read(|st| st.loaded) {
            return;
        }

        let repo = &self.shared.repo;
        let location = &self.shared.location;
        let portable = match &location.portable_dir {
            Some(dir) => matches!(
                repo.load_global(dir),
                Ok(Some(ref g)) if g.advanced.make_portable
            ),
            None => false,
        };
        let dir = location.dir(portable);

        let mut global = match repo.load_global(dir) {
            Ok(Some(global)) => {
                info!(dir = %dir.display(), "loaded global settings");
                global
            }
            Ok(None) => {
                debug!(dir = %dir.display(), "no settings file found, using defaults");
                repo.bundled_global()
            }
            Err(e) => {
                warn!("failed to read global settings, using defaults: {e}");
                repo.bundled_global()
            }
        };
        global.repair();
        global.advanced.make_portable = portable || global.advanced.make_portable;

        self.mutate(|st, _| {
            if st.loaded {
                return;
            }
            if st.global.general.current_profile.is_empty() {
                st.current_profile_id = profile_id(&global.general.current_profile);
            } else {
                global.general.current_profile = st.global.general.current_profile.clone();
            }
            st.global = global;
            st.loaded = true;
        });
    }

    /// Replaces the personal settings with those of `profile`.
    ///
    /// Reads `<profile>.ini`, falling back to the global file.  Any failure
    /// (missing passkey, wrong passkey, corrupt file) leaves default personal
    /// settings and logs a warning.  Saves for that profile are then refused
    /// until it loads successfully, is created again or is reset.
    pub fn load_personal(&self, profile: &str, passkey: Option<&Passkey>) {
        let dir = self.settings_dir();
        let (document, readable) = match self.shared.repo.load_personal(&dir, profile, passkey) {
            Ok(document) => (document, true),
            Err(e) => {
                warn!(profile, "failed to load personal settings, using defaults: {e}");
                (PersonalDocument::default(), false)
            }
        };
        let personal = PersonalSettings::from_document(document);
        debug!(
            profile,
            contacts = personal.contacts.len(),
            circles = personal.circles.len(),
            requests = personal.requests.len(),
            "personal settings loaded"
        );
        self.mutate(|st, events| {
            st.personal = personal;
            st.unreadable_personal = (!readable).then(|| profile.to_string());
            events.push(SettingsEvent::PersonalLoaded(profile.to_string()));
        });
    }

    // ── Save ─────────────────────────────────────────────────────────────────

    /// Queues a full rewrite of the global file on the worker.
    ///
    /// Returns immediately unless called from the worker.  Skipped if the
    /// settings are not loaded.
    pub fn save_global(&self) {
        let shared = Arc::clone(&self.shared);
        self.dispatcher.dispatch(move || shared.write_global());
    }

    /// Queues a full rewrite of `profile`'s personal file on the worker.
    ///
    /// Skipped if the profile name is empty or the settings are not loaded.
    pub fn save_personal(&self, profile: &dyn Profile) {
        self.save_personal_as(&profile.name(), profile.passkey());
    }

    /// Like [`save_personal`](Self::save_personal) with an explicit name and
    /// passkey.
    pub fn save_personal_as(&self, profile: &str, passkey: Option<Passkey>) {
        let shared = Arc::clone(&self.shared);
        let profile = profile.to_string();
        self.dispatcher
            .dispatch(move || shared.write_personal(&profile, passkey.as_ref()));
    }

    /// Saves the personal settings of the profile installed by the last
    /// profile switch.  Does nothing when there is none.
    pub fn save_active_personal(&self) {
        match self.read(|st| st.active.clone()) {
            Some(active) => self.save_personal_as(&active.name, active.passkey),
            None => debug!("no active profile, personal settings not saved"),
        }
    }

    /// Blocks until every queued save has been written.
    ///
    /// Returns immediately on the worker thread.  Must not be called from an
    /// async task.
    pub fn sync(&self) {
        self.dispatcher.sync();
    }

    // ── Profile lifecycle ────────────────────────────────────────────────────

    /// Switches to `profile`: records it as current, persists the global
    /// settings and, once that write has finished, loads its personal
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoActiveProfile`] (and changes nothing) when
    /// `profile` is `None`.
    pub fn update_profile_data(&self, profile: Option<&dyn Profile>) -> Result<(), StoreError> {
        let Some(profile) = profile else {
            warn!("could not load new settings: profile change to no profile");
            return Err(StoreError::NoActiveProfile);
        };
        let name = profile.name();
        let passkey = profile.passkey();
        info!(profile = %name, "switching profile");

        self.mutate(|st, events| {
            st.set_current_profile(&name, events);
            st.active = Some(ActiveProfile {
                name: name.clone(),
                passkey: passkey.clone(),
            });
        });
        self.save_global();
        // The personal load must follow the global write.
        self.dispatcher.sync();
        self.load_personal(&name, passkey.as_ref());
        Ok(())
    }

    /// Stops all saves and deletes the active profile's personal file.
    ///
    /// The global file is left alone.  Saves stay suppressed until the
    /// global settings are loaded again.
    pub fn reset_to_default(&self) {
        let (dir, active) = {
            let mut st = self.shared.lock();
            st.loaded = false;
            st.unreadable_personal = None;
            let dir = self
                .shared
                .location
                .dir(st.global.advanced.make_portable)
                .to_path_buf();
            (dir, st.active.as_ref().map(|a| a.name.clone()))
        };
        let Some(profile) = active else {
            debug!("reset without an active profile, no personal file removed");
            return;
        };
        info!(profile = %profile, "removing personal settings");
        if let Err(e) = self.shared.repo.remove_personal(&dir, &profile) {
            error!(profile = %profile, "failed to remove personal settings: {e}");
        }
    }

    /// Writes an empty clear-text personal file for a new profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the file cannot be written.
    pub fn create_personal(&self, profile: &str) -> Result<(), StoreError> {
        let dir = self.settings_dir();
        info!(profile, dir = %dir.display(), "creating personal settings");
        self.shared
            .repo
            .save_personal(&dir, profile, None, &PersonalDocument::default())?;
        self.mutate(|st, _| {
            if st.unreadable_personal.as_deref() == Some(profile) {
                st.unreadable_personal = None;
            }
        });
        Ok(())
    }

    /// Name of the current profile, empty if none.
    pub fn current_profile(&self) -> String {
        self.read(|st| st.global.general.current_profile.clone())
    }

    /// Numeric id derived from the current profile name.
    pub fn current_profile_id(&self) -> u32 {
        self.read(|st| st.current_profile_id)
    }

    /// Sets the current profile name and its derived id.
    pub fn set_current_profile(&self, name: &str) {
        self.mutate(|st, events| st.set_current_profile(name, events));
    }

    /// Whether the global settings have been loaded (saves are enabled).
    pub fn is_loaded(&self) -> bool {
        self.read(|st| st.loaded)
    }

    // ── Portable mode ────────────────────────────────────────────────────────

    pub fn make_portable(&self) -> bool {
        self.read(|st| st.global.advanced.make_portable)
    }

    /// Moves the global settings between the user directory and the
    /// executable's directory.
    ///
    /// The global file in the old directory is deleted and the settings are
    /// saved to the new one, in that order, on the worker.
    pub fn set_make_portable(&self, portable: bool) {
        let old_dir = self.mutate(|st, events| {
            if st.global.advanced.make_portable == portable {
                return None;
            }
            let old_dir = self
                .shared
                .location
                .dir(st.global.advanced.make_portable)
                .to_path_buf();
            st.global.advanced.make_portable = portable;
            events.push(SettingsEvent::MakePortableChanged(portable));
            Some(old_dir)
        });
        let Some(old_dir) = old_dir else {
            return;
        };
        let shared = Arc::clone(&self.shared);
        self.dispatcher.dispatch(move || {
            if let Err(e) = shared.repo.remove_global(&old_dir) {
                warn!(dir = %old_dir.display(), "failed to remove old global settings: {e}");
            }
            shared.write_global();
        });
    }
}

impl Drop for SettingsStore {
    fn drop(&mut self) {
        // The dispatcher drains its queue when dropped; waiting here keeps
        // the log order readable.
        self.dispatcher.sync();
        debug!("settings store closed");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
