//! In-memory episode store for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use categorizer_core::{Episode, EpisodeStore};
//! use categorizer_db::InMemoryEpisodeStore;
//!
//! #[tokio::test]
//! async fn test_with_memory_store() {
//!     let store = InMemoryEpisodeStore::new().with_episode(Episode::new("ep-1"));
//!     let episode = store.fetch_one("ep-1").await.unwrap();
//!     assert_eq!(episode.id, "ep-1");
//!     assert_eq!(store.fetch_count(), 1);
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use categorizer_core::{Episode, EpisodePatch, EpisodeStore, Error, Result};

use crate::{multiple_match, not_found};

/// A call recorded by the in-memory store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Fetch { id: String },
    Update { id: String, patch: EpisodePatch },
}

#[derive(Debug, Default)]
struct State {
    records: Vec<Episode>,
    calls: Vec<StoreCall>,
    fetch_failure: Option<String>,
    update_failure: Option<String>,
}

/// Episode store backed by a vector, with a call log and failure injection.
///
/// Records are kept in a list rather than a map so duplicate ids can be
/// seeded to exercise the multiple-match path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEpisodeStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryEpisodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a record.
    pub fn with_episode(self, episode: Episode) -> Self {
        self.insert(episode);
        self
    }

    /// Make every fetch fail with this message.
    pub fn with_fetch_failure(self, message: impl Into<String>) -> Self {
        self.lock().fetch_failure = Some(message.into());
        self
    }

    /// Make every update fail with this message.
    pub fn with_update_failure(self, message: impl Into<String>) -> Self {
        self.lock().update_failure = Some(message.into());
        self
    }

    pub fn insert(&self, episode: Episode) {
        self.lock().records.push(episode);
    }

    /// Current stored copy of the first record with this id.
    pub fn get(&self, id: &str) -> Option<Episode> {
        self.lock().records.iter().find(|e| e.id == id).cloned()
    }

    /// Every call in the order it was made.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Fetch { .. }))
            .count()
    }

    /// Patches passed to `update_one`, with their target ids.
    pub fn updates(&self) -> Vec<(String, EpisodePatch)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::Update { id, patch } => Some((id.clone(), patch.clone())),
                StoreCall::Fetch { .. } => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

#[async_trait]
impl EpisodeStore for InMemoryEpisodeStore {
    async fn fetch_one(&self, id: &str) -> Result<Episode> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Fetch { id: id.to_string() });

        if let Some(message) = &state.fetch_failure {
            return Err(Error::Store(message.clone()));
        }

        let mut matches = state.records.iter().filter(|e| e.id == id);
        let episode = match (matches.next(), matches.next()) {
            (None, _) => Err(not_found(id)),
            (Some(episode), None) => Ok(episode.clone()),
            (Some(_), Some(_)) => Err(multiple_match(id)),
        };

        debug!(
            subsystem = "store",
            component = "memory",
            op = "fetch_one",
            episode_id = %id,
            success = episode.is_ok(),
            "Fetched episode"
        );
        episode
    }

    async fn update_one(&self, id: &str, patch: &EpisodePatch) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(StoreCall::Update {
            id: id.to_string(),
            patch: patch.clone(),
        });

        if let Some(message) = &state.update_failure {
            return Err(Error::Store(message.clone()));
        }

        let mut rows_affected = 0u64;
        for episode in state.records.iter_mut().filter(|e| e.id == id) {
            episode.apply(patch);
            rows_affected += 1;
        }

        debug!(
            subsystem = "store",
            component = "memory",
            op = "update_one",
            episode_id = %id,
            rows_affected,
            "Updated episode categories"
        );

        if rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
