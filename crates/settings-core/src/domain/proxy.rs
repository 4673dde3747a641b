//! Network proxy configuration.
//!
//! The proxy type is stored as a small integer.  Values outside the known
//! range (from an older build or a corrupt write) are repaired to
//! [`ProxyType::None`] on read instead of failing the whole document.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Kind of proxy used for outgoing connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ProxyType {
    #[default]
    None,
    Socks5,
    Http,
}

impl ProxyType {
    /// Maps a stored integer to a proxy type, repairing unknown values.
    ///
    /// Any integer the file can hold is accepted here, so a value wider than
    /// the known range still decodes and is repaired.
    pub fn from_stored(value: i64) -> Self {
        match value {
            0 => ProxyType::None,
            1 => ProxyType::Socks5,
            2 => ProxyType::Http,
            other => {
                warn!(value = other, "unknown proxy type, falling back to no proxy");
                ProxyType::None
            }
        }
    }
}

impl From<i64> for ProxyType {
    fn from(value: i64) -> Self {
        Self::from_stored(value)
    }
}

impl From<ProxyType> for i64 {
    fn from(value: ProxyType) -> Self {
        match value {
            ProxyType::None => 0,
            ProxyType::Socks5 => 1,
            ProxyType::Http => 2,
        }
    }
}

/// Proxy type plus endpoint.  The port is stored as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxySettings {
    pub proxy_type: ProxyType,
    pub proxy_addr: String,
    pub proxy_port: u16,
}
