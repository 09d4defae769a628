//! # espnode-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a read-only JSON view of the entity registry
//!   (`/entities`, `/{domain}/{object_id}`)
//! - Accept switch commands over plain POSTs
//!   (`/switch/{object_id}/turn_on`, `/switch/{object_id}/turn_off`)
//! - Stream state changes and log lines as Server-Sent Events
//!   (`/events`), starting with a snapshot of every entity
//!
//! ## Dependency rule
//! Depends on `espnode-app` and `espnode-domain`. Never leaks axum
//! types into the application core.

pub mod api;
pub mod error;
pub mod router;
pub mod sse;
pub mod state;
