//! Shared application state for axum handlers.

use std::sync::Arc;

use espnode_app::device::Device;

/// Application state shared across all axum handlers.
///
/// Only the `Arc` is cloned per request; the device itself is shared
/// with the native API server.
#[derive(Clone)]
pub struct AppState {
    /// The device whose registry this adapter mirrors.
    pub device: Arc<Device>,
}

impl AppState {
    /// Create state wrapping `device`.
    #[must_use]
    pub fn new(device: Arc<Device>) -> Self {
        Self { device }
    }
}
