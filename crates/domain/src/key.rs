//! Entity keys — dense integers used on the wire instead of names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key assigned to an entity when it is registered on a device.
///
/// Keys are 1-based and dense: the Nth registered entity gets key N,
/// and the assignment is stable for the device's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(u32);

impl EntityKey {
    /// Wrap a raw wire value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// The raw wire value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_roundtrip_raw_value() {
        assert_eq!(EntityKey::new(7).get(), 7);
    }

    #[test]
    fn should_serialize_as_bare_number() {
        let json = serde_json::to_string(&EntityKey::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
