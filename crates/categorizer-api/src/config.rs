//! Process configuration sourced from the environment.
//!
//! Nothing here fails on missing values: an unset store URL or credential
//! yields empty strings, and the resulting store errors surface per request.

use std::net::SocketAddr;
use std::time::Duration;

use categorizer_core::defaults;
use categorizer_core::{Error, FixedCategorizer, Result};
use categorizer_db::{IdColumnType, StoreConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    /// Labels emitted by the fixed categorizer.
    pub category_labels: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            store: StoreConfig::new("", ""),
            category_labels: defaults::CATEGORY_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SUPABASE_URL` / `STORE_URL` | empty |
    /// | `SUPABASE_SERVICE_ROLE_KEY` / `STORE_SERVICE_KEY` | empty |
    /// | `HOST` | `0.0.0.0` |
    /// | `PORT` | `3000` |
    /// | `STORE_TIMEOUT_SECS` | `30` |
    /// | `STORE_ID_TYPE` | `uuid` (`text`, `bigint`) |
    /// | `CATEGORIZER_LABELS` | `Technology,Education` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(*k));
        let fallback = Self::default();

        let url = first(&["SUPABASE_URL", "STORE_URL"]).unwrap_or_default();
        let key = first(&["SUPABASE_SERVICE_ROLE_KEY", "STORE_SERVICE_KEY"]).unwrap_or_default();
        let timeout_secs = lookup("STORE_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults::STORE_TIMEOUT_SECS);
        let id_type = lookup("STORE_ID_TYPE")
            .and_then(|v| v.parse::<IdColumnType>().ok())
            .unwrap_or_default();

        let category_labels = match lookup("CATEGORIZER_LABELS") {
            Some(csv) => FixedCategorizer::from_csv(&csv).labels().to_vec(),
            None => fallback.category_labels,
        };

        Self {
            host: lookup("HOST").unwrap_or(fallback.host),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback.port),
            store: StoreConfig::new(url, key)
                .with_timeout(Duration::from_secs(timeout_secs))
                .with_id_type(id_type),
            category_labels,
        }
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid bind address {}:{}: {}", self.host, self.port, e)))
    }

    pub fn categorizer(&self) -> FixedCategorizer {
        FixedCategorizer::new(self.category_labels.iter().cloned())
    }
}
