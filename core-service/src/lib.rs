//! Core service façade and bootstrap helpers.
//!
//! [`CatalogCore`] turns a validated [`CoreConfig`] into a running catalog:
//! connection pool, SQLite repository, object store and the three catalog
//! services, plus a [`SongController`] that wraps every operation in the
//! [`ApiResponse`] envelope. Desktop hosts enable the `desktop-shims`
//! feature (on by default) to get the filesystem-backed object store from
//! `bridge-desktop`; other hosts inject their own [`ObjectStore`].
//!
//! ```no_run
//! # async fn example() -> core_service::Result<()> {
//! use core_service::{CatalogCore, CoreConfig};
//! use core_catalog::SongQueryParams;
//!
//! let config = CoreConfig::from_env()?;
//! core_service::init_logging(&config)?;
//!
//! let core = CatalogCore::bootstrap(config).await?;
//! let response = core.controller().list_songs(&SongQueryParams::default()).await;
//! println!("{}", serde_json::to_string(&response).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod controller;
pub mod error;

pub use api::{ApiResponse, HealthStatus, Paginated};
pub use controller::SongController;
pub use core_runtime::{CoreConfig, CoreConfigBuilder, LogFormat, LoggingConfig};
pub use error::{CoreError, Result};

use bridge_traits::{Clock, ObjectStore};
use core_catalog::db::{create_pool, DatabaseConfig};
use core_catalog::{
    SongQueryService, SongRepository, SongService, SqliteSongRepository, StatsService,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// Install the global tracing subscriber described by `config`.
pub fn init_logging(config: &CoreConfig) -> Result<()> {
    core_runtime::init_logging(config.logging.clone())?;
    Ok(())
}

/// A wired catalog instance
pub struct CatalogCore {
    config: CoreConfig,
    pool: SqlitePool,
    songs: SongService,
    queries: SongQueryService,
    stats: StatsService,
    controller: SongController,
}

impl CatalogCore {
    /// Bootstrap with the filesystem object store rooted at
    /// `config.storage_dir` and the system clock.
    #[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        let object_store = bridge_desktop::LocalObjectStore::with_root(
            config.storage_dir.clone(),
            config.public_base_url.clone(),
        );
        Self::with_object_store(
            config,
            Arc::new(object_store),
            Arc::new(bridge_traits::SystemClock),
        )
        .await
    }

    /// Bootstrap with host-provided object store and clock.
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate or the database cannot
    /// be opened and migrated.
    pub async fn with_object_store(
        config: CoreConfig,
        object_store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        info!(?config, "Bootstrapping song catalog");

        let database = DatabaseConfig::from_url(config.database_url.clone())
            .max_connections(config.max_connections);
        let pool = create_pool(database)
            .await
            .map_err(|e| CoreError::InitializationFailed(format!("database: {}", e)))?;

        let repository: Arc<dyn SongRepository> =
            Arc::new(SqliteSongRepository::new(pool.clone()));
        let timeout = config.storage_timeout;

        let songs = SongService::new(
            Arc::clone(&repository),
            object_store,
            Arc::clone(&clock),
            timeout,
        );
        let queries = SongQueryService::new(Arc::clone(&repository), timeout);
        let stats = StatsService::new(repository, timeout);
        let controller = SongController::new(songs.clone(), queries.clone(), stats.clone(), clock);

        Ok(Self {
            config,
            pool,
            songs,
            queries,
            stats,
            controller,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn songs(&self) -> &SongService {
        &self.songs
    }

    pub fn queries(&self) -> &SongQueryService {
        &self.queries
    }

    pub fn stats(&self) -> &StatsService {
        &self.stats
    }

    pub fn controller(&self) -> &SongController {
        &self.controller
    }

    /// Close the connection pool
    pub async fn shutdown(self) {
        self.pool.close().await;
        info!("Song catalog shut down");
    }
}
