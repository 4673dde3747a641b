//! Settings models and their on-disk document shapes.
//!
//! - **`global`** – sections shared by all profiles (`settings.ini`).
//! - **`personal`** – sections owned by one profile (`<profile>.ini`).
//! - **`lenient`** – key-by-key decoding shared by both documents.

pub mod global;
mod lenient;
pub mod personal;
