//! # categorizer-db
//!
//! Record store backends for the episode categorizer.
//!
//! This crate provides:
//! - [`RestEpisodeStore`]: PostgREST / Supabase-compatible HTTP store
//! - [`PgEpisodeRepository`]: direct PostgreSQL access through a lazy sqlx pool
//! - [`InMemoryEpisodeStore`]: deterministic fake with call log and failure injection
//! - [`connect_store`]: backend selection from a [`StoreConfig`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use categorizer_db::{connect_store, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = connect_store(&StoreConfig::new(
//!         "https://project.supabase.co",
//!         "service-role-key",
//!     ));
//!     let episode = store.fetch_one("3f1c...").await?;
//!     println!("Categories: {:?}", episode.categories);
//!     Ok(())
//! }
//! ```

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

// Re-export core types
pub use categorizer_core::*;

pub use memory::{InMemoryEpisodeStore, StoreCall};
pub use pool::{connect_options, create_lazy_pool, log_pool_metrics, PoolConfig};
pub use postgres::{IdColumnType, PgEpisodeRepository};
pub use rest::{RestEpisodeStore, RestStoreConfig};

/// Store error for an id with no matching record.
pub fn not_found(id: &str) -> Error {
    Error::Store(format!("Episode not found: {}", id))
}

/// Store error for an id matching more than one record.
pub fn multiple_match(id: &str) -> Error {
    Error::Store(format!("Multiple episodes match id: {}", id))
}

/// Which backend a store URL selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// `postgres://` or `postgresql://`
    Postgres,
    /// Anything else, including an empty URL.
    Rest,
}

/// Store connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store endpoint URL.
    pub url: String,
    /// Privileged credential (service role key or database password).
    pub service_key: String,
    /// Request / acquire timeout.
    pub timeout: Duration,
    /// Type of `episodes.id`, used only by the PostgreSQL backend.
    pub id_type: IdColumnType,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            timeout: Duration::from_secs(defaults::STORE_TIMEOUT_SECS),
            id_type: IdColumnType::default(),
        }
    }

    pub fn with_id_type(mut self, id_type: IdColumnType) -> Self {
        self.id_type = id_type;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn kind(&self) -> StoreKind {
        let url = self.url.trim_start();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            StoreKind::Postgres
        } else {
            StoreKind::Rest
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.service_key.is_empty()
    }
}

/// Build the store selected by the configuration.
///
/// Never fails: a backend that cannot be constructed is replaced by an
/// [`UnavailableStore`] so the process still starts and every request
/// reports the problem through the normal failure envelope.
pub fn connect_store(config: &StoreConfig) -> Arc<dyn EpisodeStore> {
    if !config.is_configured() {
        warn!(
            subsystem = "store",
            url_set = !config.url.trim().is_empty(),
            key_set = !config.service_key.is_empty(),
            "Store URL or service key is missing; requests will fail until configured"
        );
    }

    let built: Result<Arc<dyn EpisodeStore>> = match config.kind() {
        StoreKind::Postgres => connect_options(config.url.trim(), &config.service_key).map(|opts| {
            let pool = create_lazy_pool(opts, PoolConfig::new().connect_timeout(config.timeout));
            Arc::new(PgEpisodeRepository::with_id_type(pool, config.id_type)) as Arc<dyn EpisodeStore>
        }),
        StoreKind::Rest => RestEpisodeStore::new(RestStoreConfig {
            base_url: config.url.trim().to_string(),
            service_key: config.service_key.clone(),
            timeout: config.timeout,
        })
        .map(|store| Arc::new(store) as Arc<dyn EpisodeStore>),
    };

    match built {
        Ok(store) => {
            info!(
                subsystem = "store",
                backend = store.backend(),
                timeout_secs = config.timeout.as_secs(),
                "Record store ready"
            );
            store
        }
        Err(e) => {
            warn!(subsystem = "store", error = %e, "Record store unavailable");
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}

/// Store stand-in that fails every call with a fixed reason.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EpisodeStore for UnavailableStore {
    async fn fetch_one(&self, _id: &str) -> Result<Episode> {
        Err(Error::Store(self.reason.clone()))
    }

    async fn update_one(&self, _id: &str, _patch: &EpisodePatch) -> Result<()> {
        Err(Error::Store(self.reason.clone()))
    }

    fn backend(&self) -> &'static str {
        "unavailable"
    }
}
