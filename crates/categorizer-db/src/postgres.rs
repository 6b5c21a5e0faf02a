//! Direct PostgreSQL episode store.
//!
//! Assumes `episodes.categories` is `text[]` and `episodes.updated_at` is
//! `timestamptz`. The id parameter is cast to the column's declared type
//! ([`IdColumnType`]) rather than casting the column, so lookups stay on the
//! primary-key index.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;

use categorizer_core::defaults::EPISODES_TABLE;
use categorizer_core::{Episode, EpisodePatch, EpisodeStore, Error, Result};

use crate::pool::log_pool_metrics;
use crate::{multiple_match, not_found};

/// SQL type of `episodes.id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdColumnType {
    #[default]
    Uuid,
    Text,
    BigInt,
}

impl IdColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Text => "text",
            Self::BigInt => "bigint",
        }
    }

    fn fetch_sql(&self) -> String {
        format!(
            "SELECT to_jsonb(e) AS record FROM {} e WHERE e.id = $1::{} LIMIT 2",
            EPISODES_TABLE,
            self.as_sql()
        )
    }

    fn update_sql(&self) -> String {
        format!(
            "UPDATE {} SET categories = $2, updated_at = $3 WHERE id = $1::{}",
            EPISODES_TABLE,
            self.as_sql()
        )
    }
}

impl fmt::Display for IdColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for IdColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(Self::Uuid),
            "text" | "varchar" => Ok(Self::Text),
            "bigint" | "int8" | "integer" | "int" | "int4" => Ok(Self::BigInt),
            other => Err(Error::Config(format!("unsupported id column type: {}", other))),
        }
    }
}

/// PostgreSQL implementation of EpisodeStore.
#[derive(Clone)]
pub struct PgEpisodeRepository {
    pool: PgPool,
    id_type: IdColumnType,
    fetch_sql: String,
    update_sql: String,
}

impl PgEpisodeRepository {
    /// Create a new PgEpisodeRepository for a `uuid` keyed table.
    pub fn new(pool: PgPool) -> Self {
        Self::with_id_type(pool, IdColumnType::default())
    }

    pub fn with_id_type(pool: PgPool, id_type: IdColumnType) -> Self {
        Self {
            pool,
            id_type,
            fetch_sql: id_type.fetch_sql(),
            update_sql: id_type.update_sql(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn id_type(&self) -> IdColumnType {
        self.id_type
    }
}

#[async_trait]
impl EpisodeStore for PgEpisodeRepository {
    async fn fetch_one(&self, id: &str) -> Result<Episode> {
        log_pool_metrics(&self.pool);
        let start = Instant::now();
        let rows = sqlx::query(&self.fetch_sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            subsystem = "store",
            component = "postgres",
            op = "fetch_one",
            db_table = EPISODES_TABLE,
            episode_id = %id,
            result_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched episode rows"
        );

        match rows.as_slice() {
            [] => Err(not_found(id)),
            [row] => {
                let record: serde_json::Value = row.try_get("record")?;
                serde_json::from_value(record)
                    .map_err(|e| Error::Store(format!("Failed to decode episode {}: {}", id, e)))
            }
            _ => Err(multiple_match(id)),
        }
    }

    async fn update_one(&self, id: &str, patch: &EpisodePatch) -> Result<()> {
        log_pool_metrics(&self.pool);
        let start = Instant::now();
        let result = sqlx::query(&self.update_sql)
            .bind(id)
            .bind(&patch.categories)
            .bind(patch.updated_at)
            .execute(&self.pool)
            .await?;

        debug!(
            subsystem = "store",
            component = "postgres",
            op = "update_one",
            db_table = EPISODES_TABLE,
            episode_id = %id,
            rows_affected = result.rows_affected(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Updated episode categories"
        );

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
