//! Domain entities for the settings store.
//!
//! Everything here is plain data plus the rules that keep it consistent:
//! one record per contact key, contiguous circle indices, one pending request
//! per sender address.  No module in this tree touches the file system.

/// Contact records keyed by public key.
pub mod contact;

/// Ordered circle list with swap-remove semantics.
pub mod circle;

/// Pending contact requests.
pub mod request;

/// Proxy type and endpoint.
pub mod proxy;

/// Numeric profile id derivation.
pub mod profile;

/// Opaque encryption key for personal files.
pub mod passkey;
