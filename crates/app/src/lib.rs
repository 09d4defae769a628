//! # espnode-app
//!
//! Application core — the entity contract and the device registry.
//!
//! ## Responsibilities
//! - Define the [`entity::Entity`] trait that every concrete entity
//!   implements, and the [`entity::EntityCore`] identity block it
//!   embeds
//! - Own the [`device::Device`] registry: entity attachment, key
//!   assignment, command dispatch and state fan-out
//! - Provide the in-process [`event_bus`] that carries state changes
//!   and log lines to network adapters
//!
//! ## Dependency rule
//! Depends on `espnode-domain` and `espnode-proto` only (plus
//! `tokio::sync` for channels). Never imports adapter crates;
//! adapters depend on *this* crate, not the reverse.

pub mod device;
pub mod entity;
pub mod event_bus;
