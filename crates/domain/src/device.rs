//! Device identity — the metadata an emulated device advertises.

use serde::{Deserialize, Serialize};

use crate::mac::MacAddress;

/// Identity and metadata of the emulated device.
///
/// Immutable once the device starts serving; entities derive their
/// unique ids from `name` and `mac_address`, so changing either after
/// an id has been handed out would break client state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name, used in discovery records and id derivation.
    pub name: String,
    /// Hardware address reported over the native API.
    pub mac_address: MacAddress,
    /// Human-readable name, falls back to `name`.
    pub friendly_name: Option<String>,
    /// Hardware model string.
    pub model: Option<String>,
    /// Manufacturer string.
    pub manufacturer: String,
    /// Firmware project name.
    pub project_name: Option<String>,
    /// Firmware project version.
    pub project_version: Option<String>,
    /// Suggested placement (room) for controllers that support it.
    pub suggested_area: Option<String>,
    /// Network type advertised to discovery (`wifi` by default).
    pub network: Option<String>,
    /// Board tag advertised to discovery (`esp01_1m` by default).
    pub board: Option<String>,
    /// Platform tag advertised to discovery (`ESP8266` by default).
    pub platform: Option<String>,
}

impl DeviceInfo {
    /// Create a device identity with the given name and MAC.
    #[must_use]
    pub fn new(name: impl Into<String>, mac_address: MacAddress) -> Self {
        Self {
            name: name.into(),
            mac_address,
            friendly_name: None,
            model: None,
            manufacturer: "espnode".to_string(),
            project_name: None,
            project_version: None,
            suggested_area: None,
            network: None,
            board: None,
            platform: None,
        }
    }

    /// Set the human-readable name.
    #[must_use]
    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    /// Set the model string.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the firmware project name and version.
    #[must_use]
    pub fn with_project(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self.project_version = Some(version.into());
        self
    }

    /// The name shown to humans.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }

    /// Key/value pairs a discovery advertiser publishes for this
    /// device. The core never talks to discovery itself; an external
    /// advertiser reads these and registers/deregisters the record.
    #[must_use]
    pub fn discovery_properties(&self) -> Vec<(&'static str, String)> {
        let mut props = vec![
            (
                "network",
                self.network.clone().unwrap_or_else(|| "wifi".to_string()),
            ),
            (
                "board",
                self.board.clone().unwrap_or_else(|| "esp01_1m".to_string()),
            ),
            (
                "platform",
                self.platform
                    .clone()
                    .unwrap_or_else(|| "ESP8266".to_string()),
            ),
            ("mac", self.mac_address.stripped_lower()),
            ("friendly_name", self.display_name().to_string()),
        ];
        if let Some(version) = &self.project_version {
            props.push(("version", version.clone()));
        }
        props
    }
}
