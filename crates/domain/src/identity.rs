//! Entity identity derivation.
//!
//! Two pure functions shared by every entity type: the human-readable
//! object id derived from the display name, and the hashed unique id
//! derived from the owning device's identity.

use sha2::{Digest, Sha256};

use crate::mac::MacAddress;

/// Derive an object id from a display name.
///
/// Lowercases, replaces runs of whitespace with underscores and strips
/// everything that is not alphanumeric or an underscore, so
/// `"Motion  Sensor!"` becomes `"motion_sensor"`.
#[must_use]
pub fn object_id_from_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            pending_separator = !out.is_empty();
        } else if ch.is_alphanumeric() || ch == '_' {
            if pending_separator {
                out.push('_');
                pending_separator = false;
            }
            out.push(ch);
        }
    }
    out
}

/// Derive a stable unique id for an entity.
///
/// SHA-256 over device name, device MAC, object id and domain tag,
/// truncated to 16 hex characters. Deterministic for a given device
/// identity; the caller is responsible for memoising the result.
#[must_use]
pub fn unique_id(device_name: &str, mac: &MacAddress, object_id: &str, domain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(device_name.as_bytes());
    hasher.update(mac.to_string().as_bytes());
    hasher.update(object_id.as_bytes());
    hasher.update(domain.as_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_lowercase_plain_names() {
        assert_eq!(object_id_from_name("Motion"), "motion");
    }

    #[test]
    fn should_replace_whitespace_with_underscores() {
        assert_eq!(object_id_from_name("Front Door Lock"), "front_door_lock");
    }

    #[test]
    fn should_collapse_whitespace_runs() {
        assert_eq!(object_id_from_name("a   b"), "a_b");
    }

    #[test]
    fn should_strip_non_word_characters() {
        assert_eq!(object_id_from_name("Lamp (Desk) #2"), "lamp_desk_2");
    }

    #[test]
    fn should_be_stable_across_repeated_calls() {
        let first = object_id_from_name("Hall Motion");
        let second = object_id_from_name("Hall Motion");
        assert_eq!(first, second);
    }

    #[test]
    fn should_produce_sixteen_hex_chars() {
        let mac = "AC:BC:32:89:0E:C9".parse().unwrap();
        let id = unique_id("test_device", &mac, "motion", "binary_sensor");
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn should_be_deterministic_for_same_inputs() {
        let mac = "AC:BC:32:89:0E:C9".parse().unwrap();
        let a = unique_id("test_device", &mac, "motion", "binary_sensor");
        let b = unique_id("test_device", &mac, "motion", "binary_sensor");
        assert_eq!(a, b);
    }

    #[test]
    fn should_change_when_device_name_changes() {
        let mac = "AC:BC:32:89:0E:C9".parse().unwrap();
        let a = unique_id("device_a", &mac, "motion", "binary_sensor");
        let b = unique_id("device_b", &mac, "motion", "binary_sensor");
        assert_ne!(a, b);
    }

    #[test]
    fn should_change_when_domain_changes() {
        let mac = "AC:BC:32:89:0E:C9".parse().unwrap();
        let a = unique_id("test_device", &mac, "motion", "binary_sensor");
        let b = unique_id("test_device", &mac, "motion", "switch");
        assert_ne!(a, b);
    }
}
