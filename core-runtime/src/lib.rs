//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the catalog crates:
//! - Configuration (`CoreConfig`, builder and environment loading)
//! - Logging and tracing initialisation
//!
//! Nothing here touches the database or object store; those are wired up by
//! `core-service` from a validated `CoreConfig`.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
