//! # settings-core
//!
//! Domain model for the profile settings store: contact records keyed by
//! public key, circles, pending contact requests, proxy configuration and the
//! serde schemas of the global and personal settings documents.
//!
//! This crate performs no file or thread I/O.  The `settings-store` crate owns
//! the in-memory state, the worker thread and the files on disk; everything it
//! stores is defined here.
//!
//! # Architecture overview (for beginners)
//!
//! A chat client keeps two kinds of settings:
//!
//! - **Global settings** are shared by every profile on the machine: window
//!   geometry, audio devices, notification preferences and a pointer to the
//!   profile that was used last.
//!
//! - **Personal settings** belong to one profile: the contact list with its
//!   aliases and notes, pending friend requests, the circles used to group
//!   contacts, the network proxy and privacy flags.  The personal file may be
//!   encrypted with a key derived from the profile password.
//!
//! This crate is split into two modules:
//!
//! - **`domain`** – the keyed collections (`ContactStore`, `CircleList`,
//!   `RequestQueue`) and small value types (`PublicKey`, `ProxyType`,
//!   `Passkey`, `profile_id`).
//!
//! - **`settings`** – the `GlobalSettings` and `PersonalSettings` models and
//!   their on-disk document shapes.

pub mod domain;
pub mod settings;

// Re-export the most-used types at the crate root so callers can write
// `settings_core::ContactStore` instead of `settings_core::domain::contact::ContactStore`.
pub use domain::circle::{CircleList, CircleRecord};
pub use domain::contact::{AutoAcceptCall, ContactRecord, ContactStore, KeyError, PublicKey};
pub use domain::passkey::Passkey;
pub use domain::profile::profile_id;
pub use domain::proxy::{ProxySettings, ProxyType};
pub use domain::request::{PendingRequest, RequestQueue};
pub use settings::global::{
    GlobalSettings, Rect, StyleType, DEFAULT_AUTO_AWAY_MINUTES, DEFAULT_STYLE,
};
pub use settings::personal::{
    FriendSortingMethod, PersonalDocument, PersonalSettings, PrivacySettings,
};
