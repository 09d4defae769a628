//! # espnode-proto
//!
//! Wire codec for the native API.
//!
//! ## Responsibilities
//! - Variable-length unsigned integers used by frame headers
//! - A minimal proto3 field codec for the fixed external schema
//! - The typed message set and the bidirectional type-id registry
//! - Length-delimited frame assembly
//!
//! The schema is an external, frozen contract: real clients depend on
//! the exact type ids, field numbers and framing bytes, so nothing in
//! this crate is negotiable at runtime.
//!
//! ## Dependency rule
//! Depends on `espnode-domain` only. No IO; socket plumbing lives in
//! the native API adapter.

pub mod frame;
pub mod message;
pub mod varint;
pub mod wire;

pub use message::{ApiMessage, DecodeError};
