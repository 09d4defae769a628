//! # espnode-entities
//!
//! Concrete entity types built on the [`espnode_app::entity`]
//! contract.
//!
//! ## Responsibilities
//! - [`binary_sensor::BinarySensor`] — read-only boolean state pushed
//!   by the host program
//! - [`switch::Switch`] — boolean state that also accepts client
//!   commands
//! - [`listener::StateMirror`] — unlisted observer that records peer
//!   state changes
//!
//! ## Dependency rule
//! Depends on `espnode-app`, `espnode-domain` and `espnode-proto`.
//! No IO of any kind.

pub mod binary_sensor;
pub mod listener;
pub mod switch;

pub use binary_sensor::BinarySensor;
pub use listener::StateMirror;
pub use switch::Switch;
