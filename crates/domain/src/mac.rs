//! MAC address value type.
//!
//! The native protocol reports the device MAC as a colon-separated
//! string, while discovery advertisements want it lowercased without
//! separators. Both renderings come from the same six bytes.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A six-byte hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Wrap raw bytes.
    #[must_use]
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Generate a random address under the locally-administered
    /// `02:00:00` prefix, like a freshly flashed emulated board.
    #[must_use]
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self([0x02, 0x00, 0x00, rng.r#gen(), rng.r#gen(), rng.r#gen()])
    }

    /// Access the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Lowercase hex without separators, the form discovery records use
    /// (e.g. `acbc32890ec9`).
    #[must_use]
    pub fn stripped_lower(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl TryFrom<String> for MacAddress {
    type Error = MacParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in &mut bytes {
            let part = parts.next().ok_or_else(|| MacParseError {
                input: s.to_string(),
            })?;
            *byte = u8::from_str_radix(part, 16).map_err(|_| MacParseError {
                input: s.to_string(),
            })?;
        }
        if parts.next().is_some() {
            return Err(MacParseError {
                input: s.to_string(),
            });
        }
        Ok(Self(bytes))
    }
}

/// Failure to parse a `AA:BB:CC:DD:EE:FF` string.
#[derive(Debug, thiserror::Error)]
#[error("invalid MAC address: {input}")]
pub struct MacParseError {
    /// The rejected input.
    pub input: String,
}
