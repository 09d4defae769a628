//! # espnode-domain
//!
//! Pure domain model for the espnode device emulator.
//!
//! ## Responsibilities
//! - Foundational types: MAC addresses, log levels, entity categories
//! - Entity identity derivation (object ids, hashed unique ids)
//! - Device identity as advertised over the native API and discovery
//! - Domain error conventions
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! Wire encoding lives in `espnode-proto`; orchestration in
//! `espnode-app`.

pub mod category;
pub mod device;
pub mod error;
pub mod identity;
pub mod key;
pub mod log;
pub mod mac;
