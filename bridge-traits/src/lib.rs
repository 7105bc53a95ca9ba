//! # Host Bridge Traits
//!
//! Capability traits the catalog core needs from its host but does not own.
//!
//! ## Overview
//!
//! The core never talks to S3, the filesystem or the wall clock directly.
//! Each of those is behind a trait defined here and implemented by a host
//! crate (`bridge-desktop` for local development and tests).
//!
//! ## Traits
//!
//! - [`ObjectStore`](object_store::ObjectStore) - Audio attachment storage (upload/delete/exists)
//! - [`Clock`](time::Clock) - Time source for server-assigned timestamps
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Host
//! implementations should convert platform-specific errors into it and keep
//! the key or path involved in the message.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! behind `Arc` across concurrently running queries.

pub mod error;
pub mod object_store;
pub mod time;

pub use error::BridgeError;

pub use object_store::{ObjectStore, StoredObject};
pub use time::{Clock, FixedClock, LogLevel, SystemClock};
