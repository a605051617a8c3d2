use std::sync::Arc;

use pilot_core::model::PilotState;
use tracing::{debug, warn};

use crate::repository::{KeyValueStore, StorageError};

/// Fixed key of the serialized application state.
pub const STATE_KEY: &str = "mma_pilot_v1";

/// Reads and writes the whole application state as one JSON record.
#[derive(Clone)]
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
}

impl StateStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the stored state.
    ///
    /// A missing, unreadable or malformed record is treated as "no prior
    /// state" and yields an empty `PilotState`.
    pub async fn load(&self) -> PilotState {
        let raw = match self.kv.get(STATE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return PilotState::default(),
            Err(err) => {
                warn!(error = %err, "failed to read pilot state, starting empty");
                return PilotState::default();
            }
        };

        match serde_json::from_str::<PilotState>(&raw) {
            Ok(mut state) => {
                if state.normalize() {
                    warn!("stored pilot state violated invariants and was repaired");
                }
                debug!(users = state.users.len(), "loaded pilot state");
                state
            }
            Err(err) => {
                warn!(error = %err, "stored pilot state is malformed, starting empty");
                PilotState::default()
            }
        }
    }

    /// Overwrite the stored record with `state`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization fails or the backend rejects
    /// the write. The previous record is left in place in that case.
    pub async fn save(&self, state: &PilotState) -> Result<(), StorageError> {
        let raw = serde_json::to_string(state)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.set(STATE_KEY, &raw).await?;
        debug!(bytes = raw.len(), "saved pilot state");
        Ok(())
    }

    /// Remove the stored record entirely.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the delete.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.kv.remove(STATE_KEY).await
    }
}
