//! # espnoded — espnode daemon
//!
//! Composition root that wires the emulated device together and
//! starts both network surfaces.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Build the device identity and the event bus
//! - Register the demo entities (a motion sensor, a relay switch and
//!   an internal state mirror)
//! - Start the native API server and, unless disabled, the HTTP
//!   mirror
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no device logic belongs here.

mod config;

use std::sync::Arc;

use espnode_adapter_http_axum::router;
use espnode_adapter_http_axum::state::AppState;
use espnode_adapter_native_api::NativeApiServer;
use espnode_app::device::Device;
use espnode_app::event_bus::EventBus;
use espnode_entities::{BinarySensor, StateMirror, Switch};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    let bus = EventBus::new(256);
    let device = Device::new(config.device_info(), bus);
    tracing::info!(
        name = %device.info().name,
        mac = %device.info().mac_address,
        "device identity ready"
    );

    let motion = Arc::new(
        BinarySensor::new("Motion")
            .with_device_class("motion")
            .with_icon("mdi:motion-sensor"),
    );
    let relay = Arc::new(Switch::new("Relay").with_icon("mdi:power-socket-eu"));
    let mirror = Arc::new(StateMirror::new("Mirror"));
    device.add_entity(motion).await?;
    device.add_entity(relay).await?;
    device.add_entity(mirror).await?;

    let api_addr = config.api_addr().parse()?;
    let mut native_api =
        tokio::spawn(NativeApiServer::new(Arc::clone(&device)).bind_and_serve(api_addr));

    let mut web = if config.web.enabled {
        let app = router::build(AppState::new(Arc::clone(&device)));
        let listener = tokio::net::TcpListener::bind(config.web_addr()).await?;
        tracing::info!(addr = %listener.local_addr()?, "HTTP mirror listening");
        tokio::spawn(async move { axum::serve(listener, app).await })
    } else {
        tokio::spawn(std::future::pending::<Result<(), std::io::Error>>())
    };

    tokio::select! {
        result = &mut native_api => {
            result??;
        }
        result = &mut web => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            native_api.abort();
            web.abort();
        }
    }
    Ok(())
}
