use std::sync::Arc;

use pilot_core::model::Feedback;
use tracing::{debug, warn};

use crate::repository::{KeyValueStore, StorageError};

/// Fixed key of the contact-form submission list.
pub const FEEDBACK_KEY: &str = "mma_feedback";

/// Append-only list of contact-form submissions.
#[derive(Clone)]
pub struct FeedbackLog {
    kv: Arc<dyn KeyValueStore>,
}

impl FeedbackLog {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Append one submission and rewrite the list.
    ///
    /// A stored list that cannot be parsed is left as it is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be read, parsed or written back.
    pub async fn append(&self, feedback: Feedback) -> Result<usize, StorageError> {
        let mut entries = self.entries().await?;
        entries.push(feedback);
        let raw = serde_json::to_string(&entries)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.set(FEEDBACK_KEY, &raw).await?;
        debug!(count = entries.len(), "appended feedback");
        Ok(entries.len())
    }

    /// All stored submissions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored list is malformed,
    /// or another `StorageError` if the backend cannot be read.
    pub async fn entries(&self) -> Result<Vec<Feedback>, StorageError> {
        let Some(raw) = self.kv.get(FEEDBACK_KEY).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|err| {
            warn!(error = %err, "stored feedback list is malformed");
            StorageError::Serialization(err.to_string())
        })
    }
}
