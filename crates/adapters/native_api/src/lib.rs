//! # espnode-adapter-native-api
//!
//! Native API adapter — the binary RPC protocol served on TCP 6053.
//!
//! ## Responsibilities
//! - Accept client connections and run one reader task plus one writer
//!   task per connection
//! - Frame and unframe messages (`framed`), decode them through the
//!   registry and dispatch them (`connection`)
//! - Fan event-bus traffic out to subscribed connections without
//!   letting one slow client stall the rest (`server`)
//!
//! ## Dependency rule
//! Depends on `espnode-app`, `espnode-domain` and `espnode-proto`.
//! Never leaks socket types into the application core.

pub mod connection;
pub mod error;
pub mod framed;
pub mod server;

pub use error::NativeApiError;
pub use server::NativeApiServer;
