//! Unlisted observer entity.
//!
//! A [`StateMirror`] opts into peer notifications, records the last
//! boolean state seen per key and logs each change. It has no
//! descriptor and no snapshot, so clients never see it in
//! list-entities or state replay; the REST surface still renders it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use espnode_app::entity::{Entity, EntityCore};
use espnode_domain::key::EntityKey;
use espnode_domain::log::LogLevel;
use espnode_proto::ApiMessage;

/// Records every peer state change it observes.
pub struct StateMirror {
    core: EntityCore,
    observed: RwLock<BTreeMap<u32, bool>>,
}

impl StateMirror {
    /// Create a mirror named `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: EntityCore::new(name, "listener"),
            observed: RwLock::new(BTreeMap::new()),
        }
    }

    /// The last state seen for `key`, if any change was observed.
    pub async fn last_seen(&self, key: EntityKey) -> Option<bool> {
        self.observed.read().await.get(&key.get()).copied()
    }
}

#[async_trait]
impl Entity for StateMirror {
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
        let observed = self.observed.read().await;
        let states: serde_json::Map<String, serde_json::Value> = observed
            .iter()
            .map(|(key, state)| (key.to_string(), serde_json::Value::Bool(*state)))
            .collect();
        serde_json::json!({
            "id": format!("listener-{}", self.core.object_id()),
            "name": self.core.name(),
            "observed": states,
        })
    }

    fn observes_peers(&self) -> bool {
        true
    }

    async fn on_peer_state_change(&self, origin: EntityKey, snapshot: &ApiMessage) {
        let state = match snapshot {
            ApiMessage::BinarySensorStateResponse(s) => s.state,
            ApiMessage::SwitchStateResponse(s) => s.state,
            _ => return,
        };
        self.observed.write().await.insert(origin.get(), state);
        self.core.log(
            LogLevel::Debug,
            format!(
                "peer {} -> {}",
                origin.get(),
                if state { "ON" } else { "OFF" }
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use espnode_app::device::Device;
    use espnode_app::event_bus::EventBus;
    use espnode_domain::device::DeviceInfo;
    use espnode_proto::message::SwitchCommandRequest;

    use super::*;
    use crate::switch::Switch;

    #[tokio::test]
    async fn should_record_peer_changes() {
        let mac = "AC:BC:32:89:0E:C9".parse().unwrap();
        let device = Device::new(DeviceInfo::new("testbench", mac), EventBus::new(16));
        let relay = Arc::new(Switch::new("Relay"));
        let mirror = Arc::new(StateMirror::new("Mirror"));
        let relay_key = device.add_entity(relay.clone()).await.unwrap();
        device.add_entity(mirror.clone()).await.unwrap();

        let command =
            ApiMessage::SwitchCommandRequest(SwitchCommandRequest { key: 1, state: true });
        device.dispatch_command(&command).await;

        assert_eq!(mirror.last_seen(relay_key).await, Some(true));
    }

    #[tokio::test]
    async fn should_stay_invisible_to_clients() {
        let mirror = StateMirror::new("Mirror");
        assert!(mirror.descriptor().is_none());
        assert!(mirror.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn should_render_observed_states() {
        let mirror = StateMirror::new("Mirror");
        mirror
            .on_peer_state_change(
                EntityKey::new(3),
                &ApiMessage::SwitchStateResponse(espnode_proto::message::SwitchStateResponse {
                    key: 3,
                    state: true,
                }),
            )
            .await;
        let json = mirror.render_json().await;
        assert_eq!(json["id"], "listener-mirror");
        assert_eq!(json["observed"]["3"], true);
    }
}
