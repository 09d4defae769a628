//! Entity categories from the native protocol's descriptor schema.

use serde::{Deserialize, Serialize};

/// Where an entity surfaces in a controller UI.
///
/// Numeric values match the wire enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    /// Regular entity, shown with the device's main controls.
    #[default]
    None = 0,
    /// Configuration entity (e.g. a tuning knob).
    Config = 1,
    /// Diagnostic entity (e.g. an uptime sensor).
    Diagnostic = 2,
}

impl EntityCategory {
    /// Wire value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Decode a wire value; anything out of range maps to `None`.
    #[must_use]
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Config,
            2 => Self::Diagnostic,
            _ => Self::None,
        }
    }
}
