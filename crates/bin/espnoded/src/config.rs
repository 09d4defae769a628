//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `espnode.toml` in the working directory. Every field has
//! a sensible default so the file is optional. Environment variables
//! take precedence over file values.

use serde::Deserialize;

use espnode_domain::device::DeviceInfo;
use espnode_domain::mac::MacAddress;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device identity settings.
    pub device: DeviceConfig,
    /// Native API listener settings.
    pub api: ApiConfig,
    /// HTTP mirror settings.
    pub web: WebConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Identity of the emulated device.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device name, used in discovery and id derivation.
    pub name: String,
    /// MAC address as `AA:BB:CC:DD:EE:FF`. Randomised when unset.
    pub mac: Option<String>,
    /// Human-readable name shown by controllers.
    pub friendly_name: Option<String>,
    /// Hardware model string.
    pub model: Option<String>,
    /// Firmware project name.
    pub project_name: Option<String>,
    /// Firmware project version.
    pub project_version: Option<String>,
}

/// Native API listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port. Real controllers expect 6053.
    pub port: u16,
}

/// HTTP mirror configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Address to bind to.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Disable the HTTP mirror entirely.
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `espnode.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or
    /// the result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("espnode.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ESPNODE_NAME") {
            self.device.name = val;
        }
        if let Ok(val) = std::env::var("ESPNODE_MAC") {
            self.device.mac = Some(val);
        }
        if let Ok(val) = std::env::var("ESPNODE_API_PORT") {
            if let Ok(port) = val.parse() {
                self.api.port = port;
            }
        }
        if let Ok(val) = std::env::var("ESPNODE_WEB_PORT") {
            if let Ok(port) = val.parse() {
                self.web.port = port;
            }
        }
        if let Ok(val) = std::env::var("ESPNODE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.name.is_empty() {
            return Err(ConfigError::Validation(
                "device name must not be empty".to_string(),
            ));
        }
        if self.api.port == 0 {
            return Err(ConfigError::Validation(
                "api port must be non-zero".to_string(),
            ));
        }
        if self.web.enabled && self.web.port == 0 {
            return Err(ConfigError::Validation(
                "web port must be non-zero".to_string(),
            ));
        }
        if let Some(mac) = &self.device.mac {
            mac.parse::<MacAddress>()
                .map_err(|err| ConfigError::Validation(err.to_string()))?;
        }
        Ok(())
    }

    /// Build the device identity, randomising the MAC when the config
    /// does not pin one.
    #[must_use]
    pub fn device_info(&self) -> DeviceInfo {
        let mac = self
            .device
            .mac
            .as_deref()
            .and_then(|mac| mac.parse().ok())
            .unwrap_or_else(MacAddress::random);
        let mut info = DeviceInfo::new(&self.device.name, mac);
        if let Some(friendly_name) = &self.device.friendly_name {
            info = info.with_friendly_name(friendly_name);
        }
        if let Some(model) = &self.device.model {
            info = info.with_model(model);
        }
        if let (Some(name), Some(version)) = (&self.device.project_name, &self.device.project_version)
        {
            info = info.with_project(name, version);
        }
        info
    }

    /// Return the native API `host:port` bind address.
    #[must_use]
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Return the HTTP mirror `host:port` bind address.
    #[must_use]
    pub fn web_addr(&self) -> String {
        format!("{}:{}", self.web.host, self.web.port)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "espnode".to_string(),
            mac: None,
            friendly_name: None,
            model: None,
            project_name: None,
            project_version: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6053,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enabled: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "espnoded=info,espnode=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
