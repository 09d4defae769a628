//! Domain error types.

/// Failures when registering entities on a device.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two entities resolved to the same object id. Fatal at setup:
    /// the device must not start with an ambiguous entity set.
    #[error("duplicate object_id: {object_id}")]
    DuplicateObjectId {
        /// The conflicting id.
        object_id: String,
    },
    /// The entity was already registered on a device.
    #[error("entity {object_id} is already attached to a device")]
    AlreadyAttached {
        /// The entity's object id.
        object_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_the_conflicting_id_in_the_message() {
        let err = RegistryError::DuplicateObjectId {
            object_id: "motion".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate object_id: motion");
    }
}
