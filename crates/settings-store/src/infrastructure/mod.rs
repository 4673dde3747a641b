//! Infrastructure layer of the settings store.
//!
//! Contains the OS-facing adapters: settings files on disk, at-rest
//! encryption, settings directory resolution and a password-based profile.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `settings_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`storage`** – the [`storage::repository::FileRepository`] implementing
//!   the repository port, plus the global file, personal file, cipher and
//!   location helpers it is built from.
//! - **`profile`** – [`profile::LocalProfile`], a profile whose passkey is
//!   derived from a password.
//! - **`bootstrap`** – wires a store to the file repository for a resolved
//!   directory.

pub mod bootstrap;
pub mod profile;
pub mod storage;
