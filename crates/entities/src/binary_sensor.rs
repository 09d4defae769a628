//! Read-only boolean entity.
//!
//! The host program drives the state through [`BinarySensor::set_state`];
//! clients can only observe it. Publishing happens on actual change,
//! never on a same-value write.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use espnode_app::entity::{Entity, EntityCore};
use espnode_domain::category::EntityCategory;
use espnode_domain::log::LogLevel;
use espnode_proto::ApiMessage;
use espnode_proto::message::{BinarySensorStateResponse, ListEntitiesBinarySensorResponse};

/// A boolean sensor such as a motion detector or a door contact.
pub struct BinarySensor {
    core: EntityCore,
    state: RwLock<bool>,
}

impl BinarySensor {
    /// Create a sensor named `name`, initially off.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: EntityCore::new(name, "binary_sensor"),
            state: RwLock::new(false),
        }
    }

    /// Override the object id derived from the name.
    #[must_use]
    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.core = self.core.with_object_id(object_id);
        self
    }

    /// Set the device class, e.g. `motion` or `door`.
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

    /// The current state.
    pub async fn state(&self) -> bool {
        *self.state.read().await
    }

    /// Commit a new state. Publishes to peers and the event bus only
    /// when the value actually changed.
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
impl Entity for BinarySensor {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn descriptor(&self) -> Option<ApiMessage> {
        let key = self.core.key()?;
        Some(ApiMessage::ListEntitiesBinarySensorResponse(
            ListEntitiesBinarySensorResponse {
                object_id: self.core.object_id().to_string(),
                key: key.get(),
                name: self.core.name().to_string(),
                unique_id: self.core.unique_id().unwrap_or_default().to_string(),
                device_class: self.core.device_class().to_string(),
                is_status_binary_sensor: false,
                disabled_by_default: false,
                icon: self.core.icon().to_string(),
                entity_category: self.core.entity_category(),
            },
        ))
    }

    async fn snapshot(&self) -> Option<ApiMessage> {
        let key = self.core.key()?;
        Some(ApiMessage::BinarySensorStateResponse(
            BinarySensorStateResponse {
                key: key.get(),
                state: self.state().await,
                missing_state: false,
            },
        ))
    }

    async fn render_json(&self) -> serde_json::Value {
        let state = self.state().await;
        serde_json::json!({
            "id": format!("binary_sensor-{}", self.core.object_id()),
            "name": self.core.name(),
            "state": if state { "ON" } else { "OFF" },
            "value": state,
        })
    }

    /// Sensors are read-only; every inbound command is refused.
    fn can_handle(&self, _message: &ApiMessage) -> bool {
        false
    }
}

/// Convenience for registration call sites.
impl From<BinarySensor> for Arc<dyn Entity> {
    fn from(sensor: BinarySensor) -> Self {
        Arc::new(sensor)
    }
}

#[cfg(test)]
mod tests {
    use espnode_app::device::Device;
    use espnode_app::event_bus::{Event, EventBus};
    use espnode_domain::device::DeviceInfo;

    use super::*;

    async fn attached_sensor() -> (Arc<Device>, Arc<BinarySensor>) {
        let mac = "AC:BC:32:89:0E:C9".parse().unwrap();
        let device = Device::new(DeviceInfo::new("testbench", mac), EventBus::new(16));
        let sensor = Arc::new(BinarySensor::new("Motion").with_device_class("motion"));
        device.add_entity(sensor.clone()).await.unwrap();
        (device, sensor)
    }

    #[tokio::test]
    async fn should_start_off() {
        let (_device, sensor) = attached_sensor().await;
        assert!(!sensor.state().await);
    }

    #[tokio::test]
    async fn should_publish_on_actual_change_only() {
        let (device, sensor) = attached_sensor().await;
        let mut rx = device.bus().subscribe();

        sensor.set_state(true).await;
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::StateChange { .. } | Event::Log { .. }
        ));
        // Drain whatever the first change produced.
        while rx.try_recv().is_ok() {}

        sensor.set_state(true).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_describe_itself_with_attached_key() {
        let (_device, sensor) = attached_sensor().await;
        let Some(ApiMessage::ListEntitiesBinarySensorResponse(desc)) = sensor.descriptor() else {
            panic!("expected binary sensor descriptor");
        };
        assert_eq!(desc.object_id, "motion");
        assert_eq!(desc.key, 1);
        assert_eq!(desc.device_class, "motion");
        assert_eq!(desc.unique_id.len(), 16);
    }

    #[tokio::test]
    async fn should_render_rest_document() {
        let (_device, sensor) = attached_sensor().await;
        sensor.set_state(true).await;
        let json = sensor.render_json().await;
        assert_eq!(json["id"], "binary_sensor-motion");
        assert_eq!(json["state"], "ON");
        assert_eq!(json["value"], true);
    }

    #[tokio::test]
    async fn should_snapshot_current_state() {
        let (_device, sensor) = attached_sensor().await;
        sensor.set_state(true).await;
        let Some(ApiMessage::BinarySensorStateResponse(snapshot)) = sensor.snapshot().await else {
            panic!("expected state snapshot");
        };
        assert_eq!(snapshot.key, 1);
        assert!(snapshot.state);
    }
}
