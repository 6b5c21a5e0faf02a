//! Core traits for the categorizer's external seams.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable stores and classifiers and letting tests
//! substitute in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Episode, EpisodePatch};

// =============================================================================
// EPISODE STORE
// =============================================================================

/// Point access to the `episodes` table.
#[async_trait]
pub trait EpisodeStore: Send + Sync {
    /// Fetch the single record whose id matches exactly.
    ///
    /// Zero matches, more than one match, and transport failures are all
    /// `Error::Store`.
    async fn fetch_one(&self, id: &str) -> Result<Episode>;

    /// Write `categories` and `updated_at` onto the record with this id.
    async fn update_one(&self, id: &str, patch: &EpisodePatch) -> Result<()>;

    /// Backend name for logs ("rest", "postgres", "memory").
    fn backend(&self) -> &'static str;
}

// =============================================================================
// CATEGORIZER
// =============================================================================

/// Computes topical labels for an episode.
///
/// Implementations must be deterministic for a given record and produce
/// non-empty label strings. An empty list is a valid result.
#[async_trait]
pub trait Categorizer: Send + Sync {
    /// Compute labels for the record.
    async fn categorize(&self, episode: &Episode) -> Result<Vec<String>>;

    /// Categorizer name for logs.
    fn name(&self) -> &'static str;
}
