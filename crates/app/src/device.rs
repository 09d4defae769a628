//! The device registry.
//!
//! One [`Device`] owns the entity list, hands out keys, routes
//! commands and fans out state changes. Keys are assigned in
//! registration order starting at 1 and never reused.

use std::sync::Arc;

use tokio::sync::RwLock;

use espnode_domain::device::DeviceInfo;
use espnode_domain::error::RegistryError;
use espnode_domain::key::EntityKey;
use espnode_domain::log::LogLevel;
use espnode_proto::ApiMessage;
use espnode_proto::message::DeviceInfoResponse;

use crate::entity::Entity;
use crate::event_bus::{Event, EventBus};

/// The emulated device: identity plus the entity registry.
pub struct Device {
    info: DeviceInfo,
    entities: RwLock<Vec<Arc<dyn Entity>>>,
    bus: EventBus,
}

impl Device {
    /// Create a device with no entities.
    #[must_use]
    pub fn new(info: DeviceInfo, bus: EventBus) -> Arc<Self> {
        Arc::new(Self {
            info,
            entities: RwLock::new(Vec::new()),
            bus,
        })
    }

    #[must_use]
    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Register an entity and assign it the next key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateObjectId`] when another entity
    /// already claimed the same object id, and
    /// [`RegistryError::AlreadyAttached`] when the entity was
    /// registered before.
    pub async fn add_entity(
        self: &Arc<Self>,
        entity: Arc<dyn Entity>,
    ) -> Result<EntityKey, RegistryError> {
        let mut entities = self.entities.write().await;
        let object_id = entity.core().object_id();
        if entities.iter().any(|e| e.core().object_id() == object_id) {
            return Err(RegistryError::DuplicateObjectId {
                object_id: object_id.to_string(),
            });
        }
        let key = EntityKey::new(entities.len() as u32 + 1);
        entity.core().attach(key, self)?;
        entities.push(entity);
        Ok(key)
    }

    /// All entities in key order.
    pub async fn entities(&self) -> Vec<Arc<dyn Entity>> {
        self.entities.read().await.clone()
    }

    /// Look an entity up by key.
    pub async fn entity_by_key(&self, key: EntityKey) -> Option<Arc<dyn Entity>> {
        self.entities
            .read()
            .await
            .iter()
            .find(|e| e.core().key() == Some(key))
            .cloned()
    }

    /// Look an entity up by object id.
    pub async fn entity_by_object_id(&self, object_id: &str) -> Option<Arc<dyn Entity>> {
        self.entities
            .read()
            .await
            .iter()
            .find(|e| e.core().object_id() == object_id)
            .cloned()
    }

    /// List-entities descriptors for every advertised entity, in key
    /// order.
    pub async fn descriptors(&self) -> Vec<ApiMessage> {
        self.entities
            .read()
            .await
            .iter()
            .filter_map(|e| e.descriptor())
            .collect()
    }

    /// The device-info message sent to clients.
    #[must_use]
    pub fn device_info_response(&self) -> DeviceInfoResponse {
        DeviceInfoResponse {
            uses_password: false,
            name: self.info.name.clone(),
            mac_address: self.info.mac_address.to_string(),
            model: self.info.model.clone().unwrap_or_default(),
            project_name: self.info.project_name.clone().unwrap_or_default(),
            project_version: self.info.project_version.clone().unwrap_or_default(),
        }
    }

    /// Route an inbound command to the entity it addresses.
    ///
    /// Commands with an unknown key or a key outside the registry are
    /// logged and dropped; a bad client must not take the device down.
    pub async fn dispatch_command(&self, message: &ApiMessage) {
        let Some(key) = message.entity_key() else {
            tracing::debug!(type_id = message.type_id(), "command carries no entity key");
            return;
        };
        let Some(entity) = self.entity_by_key(key).await else {
            tracing::debug!(key = key.get(), "command addresses unknown entity key");
            return;
        };
        if entity.can_handle(message) {
            entity.handle(message).await;
        } else {
            tracing::debug!(
                key = key.get(),
                type_id = message.type_id(),
                "entity does not accept this command type"
            );
        }
    }

    /// Fan a committed state change out to observing peers, then to
    /// the event bus. The originating entity never hears its own
    /// change.
    pub async fn publish_state_change(&self, origin: EntityKey, snapshot: ApiMessage) {
        let observers: Vec<Arc<dyn Entity>> = {
            let entities = self.entities.read().await;
            entities
                .iter()
                .filter(|e| e.observes_peers() && e.core().key() != Some(origin))
                .cloned()
                .collect()
        };
        for observer in observers {
            observer.on_peer_state_change(origin, &snapshot).await;
        }
        self.bus.publish(Event::StateChange {
            key: origin,
            snapshot,
        });
    }

    /// Emit a log line through tracing and onto the event bus.
    pub fn log(&self, level: LogLevel, tag: &str, message: String) {
        match level {
            LogLevel::Error => tracing::error!(tag, "{message}"),
            LogLevel::Warn => tracing::warn!(tag, "{message}"),
            LogLevel::None | LogLevel::Info | LogLevel::Config => {
                tracing::info!(tag, "{message}");
            }
            LogLevel::Debug => tracing::debug!(tag, "{message}"),
            LogLevel::Verbose | LogLevel::VeryVerbose => tracing::trace!(tag, "{message}"),
        }
        self.bus.publish(Event::Log {
            level,
            tag: tag.to_string(),
            message,
            timestamp: chrono::Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use espnode_proto::message::{SwitchCommandRequest, SwitchStateResponse};

    use super::*;
    use crate::entity::EntityCore;

    struct Probe {
        core: EntityCore,
        observes: bool,
        handled: AtomicBool,
        peer_seen: AtomicBool,
    }

    impl Probe {
        fn new(name: &str) -> Arc<Self> {
            Self::with_observation(name, false)
        }

        fn with_observation(name: &str, observes: bool) -> Arc<Self> {
            Arc::new(Self {
                core: EntityCore::new(name, "switch"),
                observes,
                handled: AtomicBool::new(false),
                peer_seen: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl Entity for Probe {
        fn core(&self) -> &EntityCore {
            &self.core
        }

        fn descriptor(&self) -> Option<ApiMessage> {
            None
        }

        async fn snapshot(&self) -> Option<ApiMessage> {
            None
        }

        async fn render_json(&self) -> serde_json::Value {
            serde_json::json!({})
        }

        fn can_handle(&self, message: &ApiMessage) -> bool {
            message.entity_key() == self.core.key()
        }

        async fn handle(&self, _message: &ApiMessage) {
            self.handled.store(true, Ordering::SeqCst);
        }

        fn observes_peers(&self) -> bool {
            self.observes
        }

        async fn on_peer_state_change(&self, _origin: EntityKey, _snapshot: &ApiMessage) {
            self.peer_seen.store(true, Ordering::SeqCst);
        }
    }

    fn test_device() -> Arc<Device> {
        let mac = "AC:BC:32:89:0E:C9".parse().unwrap();
        Device::new(DeviceInfo::new("testbench", mac), EventBus::new(16))
    }

    #[tokio::test]
    async fn should_assign_sequential_keys_starting_at_one() {
        let device = test_device();
        let first = device.add_entity(Probe::new("First")).await.unwrap();
        let second = device.add_entity(Probe::new("Second")).await.unwrap();
        assert_eq!(first, EntityKey::new(1));
        assert_eq!(second, EntityKey::new(2));
    }

    #[tokio::test]
    async fn should_reject_duplicate_object_id() {
        let device = test_device();
        device.add_entity(Probe::new("Relay")).await.unwrap();
        let err = device.add_entity(Probe::new("relay")).await.unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateObjectId { .. }));
    }

    #[tokio::test]
    async fn should_reject_registering_same_entity_twice() {
        let device = test_device();
        let other = test_device();
        let probe = Probe::new("Relay");
        device.add_entity(probe.clone()).await.unwrap();
        let err = other.add_entity(probe).await.unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyAttached { .. }));
    }

    #[tokio::test]
    async fn should_realise_unique_id_at_attachment() {
        let device = test_device();
        let probe = Probe::new("Relay");
        device.add_entity(probe.clone()).await.unwrap();
        let unique_id = probe.core().unique_id().unwrap();
        assert_eq!(unique_id.len(), 16);
        assert!(unique_id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn should_dispatch_command_to_addressed_entity() {
        let device = test_device();
        let first = Probe::new("First");
        let second = Probe::new("Second");
        device.add_entity(first.clone()).await.unwrap();
        device.add_entity(second.clone()).await.unwrap();

        let command =
            ApiMessage::SwitchCommandRequest(SwitchCommandRequest { key: 2, state: true });
        device.dispatch_command(&command).await;

        assert!(!first.handled.load(Ordering::SeqCst));
        assert!(second.handled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn should_drop_command_for_unknown_key() {
        let device = test_device();
        let probe = Probe::new("Relay");
        device.add_entity(probe.clone()).await.unwrap();

        let command =
            ApiMessage::SwitchCommandRequest(SwitchCommandRequest { key: 99, state: true });
        device.dispatch_command(&command).await;

        assert!(!probe.handled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn should_notify_observers_but_never_the_origin() {
        let device = test_device();
        let origin = Probe::with_observation("Origin", true);
        let observer = Probe::with_observation("Observer", true);
        let bystander = Probe::new("Bystander");
        let origin_key = device.add_entity(origin.clone()).await.unwrap();
        device.add_entity(observer.clone()).await.unwrap();
        device.add_entity(bystander.clone()).await.unwrap();

        let snapshot = ApiMessage::SwitchStateResponse(SwitchStateResponse {
            key: origin_key.get(),
            state: true,
        });
        device.publish_state_change(origin_key, snapshot).await;

        assert!(!origin.peer_seen.load(Ordering::SeqCst));
        assert!(observer.peer_seen.load(Ordering::SeqCst));
        assert!(!bystander.peer_seen.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn should_publish_state_change_on_bus() {
        let device = test_device();
        let mut rx = device.bus().subscribe();

        let snapshot = ApiMessage::SwitchStateResponse(SwitchStateResponse {
            key: 1,
            state: true,
        });
        device
            .publish_state_change(EntityKey::new(1), snapshot)
            .await;

        let Event::StateChange { key, .. } = rx.recv().await.unwrap() else {
            panic!("expected state change");
        };
        assert_eq!(key, EntityKey::new(1));
    }

    #[tokio::test]
    async fn should_publish_log_lines_on_bus() {
        let device = test_device();
        let mut rx = device.bus().subscribe();

        device.log(LogLevel::Info, "api", "client connected".to_string());

        let Event::Log { level, tag, message, .. } = rx.recv().await.unwrap() else {
            panic!("expected log event");
        };
        assert_eq!(level, LogLevel::Info);
        assert_eq!(tag, "api");
        assert_eq!(message, "client connected");
    }
}
