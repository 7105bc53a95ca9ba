//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `ObjectStore` using `tokio::fs` below a local root directory
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::LocalObjectStore;
//! use bridge_traits::ObjectStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn ObjectStore> =
//!     Arc::new(LocalObjectStore::with_root("/var/lib/catalog", "http://localhost:3000"));
//! ```

mod object_store;

pub use object_store::LocalObjectStore;
