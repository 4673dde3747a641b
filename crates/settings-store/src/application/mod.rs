//! Application layer of the settings store.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The application layer sits between the pure domain model in
//! `settings-core` and the infrastructure that touches the disk.  Code here:
//!
//! - **Owns the shared state** and decides which mutations are persisted to
//!   the global file and which to the personal file.
//! - **Depends on abstractions** (the [`ports::SettingsRepository`] and
//!   [`ports::Profile`] traits) rather than concrete file handling, so tests
//!   can run against in-memory doubles.
//! - **Contains no file system access** of its own.
//!
//! # Sub-modules
//!
//! - **`store`** – [`store::SettingsStore`], the thread-safe façade: load,
//!   save, profile switch and reset.
//! - **`preferences`** – getters and setters for every scalar setting.
//! - **`contacts`** – per-contact, circle and pending-request operations.
//! - **`dispatcher`** – the single worker thread that performs all writes.
//! - **`events`** – change notifications delivered after the lock is released.
//! - **`ports`** – traits implemented by the infrastructure layer.

pub mod contacts;
pub mod dispatcher;
pub mod events;
pub mod ports;
pub mod preferences;
pub mod store;
