//! Workspace entry crate.
//!
//! Re-exports the catalog façade so host applications can depend on
//! `catalog-workspace` alone and pick platform shims through features.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
