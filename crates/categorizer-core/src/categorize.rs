//! Reference categorizer.

use async_trait::async_trait;
use tracing::trace;

use crate::defaults;
use crate::error::Result;
use crate::models::Episode;
use crate::traits::Categorizer;

/// Assigns the same configured labels to every episode, ignoring content.
#[derive(Debug, Clone)]
pub struct FixedCategorizer {
    labels: Vec<String>,
}

impl Default for FixedCategorizer {
    fn default() -> Self {
        Self::new(defaults::CATEGORY_LABELS.iter().map(|s| s.to_string()))
    }
}

impl FixedCategorizer {
    /// Create a categorizer with the given labels.
    ///
    /// Blank labels are dropped and surrounding whitespace is trimmed.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels
            .into_iter()
            .map(Into::into)
            .map(|l: String| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self { labels }
    }

    /// Parse a comma-separated label list, e.g. `"Technology,Education"`.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[async_trait]
impl Categorizer for FixedCategorizer {
    async fn categorize(&self, episode: &Episode) -> Result<Vec<String>> {
        trace!(
            subsystem = "categorizer",
            component = "fixed",
            episode_id = %episode.id,
            labels = ?self.labels,
            "Assigning fixed labels"
        );
        Ok(self.labels.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
