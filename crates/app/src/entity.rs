//! The entity contract.
//!
//! Every concrete entity implements [`Entity`] and embeds an
//! [`EntityCore`] that carries its identity and its link back to the
//! owning device. Entities know nothing about sockets; they publish
//! state through the core and the device fans it out.

use std::sync::{Arc, OnceLock, Weak};

use async_trait::async_trait;

use espnode_domain::category::EntityCategory;
use espnode_domain::error::RegistryError;
use espnode_domain::identity;
use espnode_domain::key::EntityKey;
use espnode_domain::log::LogLevel;
use espnode_proto::ApiMessage;

use crate::device::Device;

/// Set once when the device registers the entity.
#[derive(Debug)]
struct Attachment {
    key: EntityKey,
    device: Weak<Device>,
    unique_id: String,
}

/// Identity block embedded in every concrete entity.
///
/// Constructed free-standing, then attached exactly once by
/// [`Device::add_entity`](crate::device::Device::add_entity); the key
/// and unique id only exist after attachment.
#[derive(Debug)]
pub struct EntityCore {
    name: String,
    object_id: String,
    domain: &'static str,
    icon: String,
    device_class: String,
    entity_category: EntityCategory,
    attachment: OnceLock<Attachment>,
}

impl EntityCore {
    /// Create a core for an entity named `name` in `domain`
    /// (e.g. `"binary_sensor"`). The object id is derived from the
    /// name.
    #[must_use]
    pub fn new(name: impl Into<String>, domain: &'static str) -> Self {
        let name = name.into();
        let object_id = identity::object_id_from_name(&name);
        Self {
            name,
            object_id,
            domain,
            icon: String::new(),
            device_class: String::new(),
            entity_category: EntityCategory::None,
            attachment: OnceLock::new(),
        }
    }

    /// Override the derived object id. Must happen before the entity
    /// is registered on a device.
    #[must_use]
    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = object_id.into();
        self
    }

    /// Set the Material Design icon, e.g. `mdi:motion-sensor`.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Set the device class advertised in the descriptor.
    #[must_use]
    pub fn with_device_class(mut self, device_class: impl Into<String>) -> Self {
        self.device_class = device_class.into();
        self
    }

    /// Set the entity category advertised in the descriptor.
    #[must_use]
    pub fn with_category(mut self, category: EntityCategory) -> Self {
        self.entity_category = category;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    #[must_use]
    pub fn domain(&self) -> &'static str {
        self.domain
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn device_class(&self) -> &str {
        &self.device_class
    }

    #[must_use]
    pub fn entity_category(&self) -> EntityCategory {
        self.entity_category
    }

    /// The registry key, once attached.
    #[must_use]
    pub fn key(&self) -> Option<EntityKey> {
        self.attachment.get().map(|a| a.key)
    }

    /// The stable unique id, once attached.
    #[must_use]
    pub fn unique_id(&self) -> Option<&str> {
        self.attachment.get().map(|a| a.unique_id.as_str())
    }

    /// The owning device, if attached and still alive.
    #[must_use]
    pub fn device(&self) -> Option<Arc<Device>> {
        self.attachment.get().and_then(|a| a.device.upgrade())
    }

    /// Bind this core to `device` under `key`.
    ///
    /// The unique id is realised here, from the device identity at
    /// attachment time.
    pub(crate) fn attach(&self, key: EntityKey, device: &Arc<Device>) -> Result<(), RegistryError> {
        let info = device.info();
        let attachment = Attachment {
            key,
            device: Arc::downgrade(device),
            unique_id: identity::unique_id(
                &info.name,
                &info.mac_address,
                &self.object_id,
                self.domain,
            ),
        };
        self.attachment
            .set(attachment)
            .map_err(|_| RegistryError::AlreadyAttached {
                object_id: self.object_id.clone(),
            })
    }

    /// Publish a committed state change to peers and the event bus.
    ///
    /// No-op before attachment or after the device is gone.
    pub async fn notify_state_change(&self, snapshot: ApiMessage) {
        let Some(attachment) = self.attachment.get() else {
            return;
        };
        let Some(device) = attachment.device.upgrade() else {
            return;
        };
        device.publish_state_change(attachment.key, snapshot).await;
    }

    /// Emit a log line tagged with this entity's object id.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if let Some(device) = self.device() {
            device.log(level, self.object_id(), message.into());
        }
    }
}

/// A thing the device exposes: a sensor, a switch, or an internal
/// observer.
///
/// `descriptor` and `snapshot` return `None` for entities that are
/// not advertised to clients.
#[async_trait]
pub trait Entity: Send + Sync {
    /// The identity block shared by all entities.
    fn core(&self) -> &EntityCore;

    /// The list-entities descriptor, or `None` for unlisted entities.
    fn descriptor(&self) -> Option<ApiMessage>;

    /// The current state as a ready-to-send message, or `None` for
    /// stateless entities.
    async fn snapshot(&self) -> Option<ApiMessage>;

    /// The REST representation of this entity.
    async fn render_json(&self) -> serde_json::Value;

    /// Cheap pre-filter before [`Entity::handle`] runs. Accepts by
    /// default; read-only entities override this to refuse commands.
    fn can_handle(&self, message: &ApiMessage) -> bool {
        let _ = message;
        true
    }

    /// Apply a command previously accepted by [`Entity::can_handle`].
    async fn handle(&self, message: &ApiMessage) {
        let _ = message;
    }

    /// Whether this entity wants peer state notifications. Off by
    /// default; peer fan-out skips everything else.
    fn observes_peers(&self) -> bool {
        false
    }

    /// Called for every peer state change when
    /// [`Entity::observes_peers`] returns true. Never called for the
    /// entity's own changes.
    async fn on_peer_state_change(&self, origin: EntityKey, snapshot: &ApiMessage) {
        let _ = (origin, snapshot);
    }
}
