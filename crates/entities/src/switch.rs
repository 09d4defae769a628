//! Commandable boolean entity.
//!
//! Same state model as a binary sensor, plus a command path: a client
//! can flip it remotely and every other subscriber sees the result.

use async_trait::async_trait;
use tokio::sync::RwLock;

use espnode_app::entity::{Entity, EntityCore};
use espnode_domain::category::EntityCategory;
use espnode_domain::log::LogLevel;
use espnode_proto::ApiMessage;
use espnode_proto::message::{ListEntitiesSwitchResponse, SwitchStateResponse};

/// A boolean actuator such as a relay or a plug.
pub struct Switch {
    core: EntityCore,
    state: RwLock<bool>,
    assumed_state: bool,
}

impl Switch {
    /// Create a switch named `name`, initially off.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: EntityCore::new(name, "switch"),
            state: RwLock::new(false),
            assumed_state: false,
        }
    }

    /// Override the object id derived from the name.
    #[must_use]
    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.core = self.core.with_object_id(object_id);
        self
    }

    /// Set the device class, e.g. `outlet`.
    #[must_use]
    pub fn with_device_class(mut self, device_class: impl Into<String>) -> Self {
        self.core = self.core.with_device_class(device_class);
        self
    }

    /// Set the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.core = self.core.with_icon(icon);
        self
    }

    /// Set the entity category.
    #[must_use]
    pub fn with_category(mut self, category: EntityCategory) -> Self {
        self.core = self.core.with_category(category);
        self
    }

    /// Advertise that the real state cannot be read back.
    #[must_use]
    pub fn with_assumed_state(mut self) -> Self {
        self.assumed_state = true;
        self
    }

    /// The current state.
    pub async fn state(&self) -> bool {
        *self.state.read().await
    }

    /// Commit a new state. Publishes only when the value actually
    /// changed.
    pub async fn set_state(&self, value: bool) {
        {
            let mut state = self.state.write().await;
            if *state == value {
                return;
            }
            *state = value;
        }
        self.core.log(
            LogLevel::Debug,
            format!("state -> {}", if value { "ON" } else { "OFF" }),
        );
        if let Some(snapshot) = self.snapshot().await {
            self.core.notify_state_change(snapshot).await;
        }
    }
}

#[async_trait]
impl Entity for Switch {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn descriptor(&self) -> Option<ApiMessage> {
        let key = self.core.key()?;
        Some(ApiMessage::ListEntitiesSwitchResponse(
            ListEntitiesSwitchResponse {
                object_id: self.core.object_id().to_string(),
                key: key.get(),
                name: self.core.name().to_string(),
                unique_id: self.core.unique_id().unwrap_or_default().to_string(),
                icon: self.core.icon().to_string(),
                assumed_state: self.assumed_state,
                disabled_by_default: false,
                entity_category: self.core.entity_category(),
                device_class: self.core.device_class().to_string(),
            },
        ))
    }

    async fn snapshot(&self) -> Option<ApiMessage> {
        let key = self.core.key()?;
        Some(ApiMessage::SwitchStateResponse(SwitchStateResponse {
            key: key.get(),
            state: self.state().await,
        }))
    }

    async fn render_json(&self) -> serde_json::Value {
        let state = self.state().await;
        serde_json::json!({
            "id": format!("switch-{}", self.core.object_id()),
            "name": self.core.name(),
            "state": if state { "ON" } else { "OFF" },
            "value": state,
        })
    }

    fn can_handle(&self, message: &ApiMessage) -> bool {
        matches!(message, ApiMessage::SwitchCommandRequest(_))
            && message.entity_key() == self.core.key()
    }

    async fn handle(&self, message: &ApiMessage) {
        if let ApiMessage::SwitchCommandRequest(command) = message {
            self.core.log(
                LogLevel::Info,
                format!("command: turn {}", if command.state { "on" } else { "off" }),
            );
            self.set_state(command.state).await;
        }
    }
}
