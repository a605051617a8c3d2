#![forbid(unsafe_code)]

pub mod feedback_log;
pub mod repository;
pub mod sqlite;
pub mod state_store;

pub use feedback_log::{FEEDBACK_KEY, FeedbackLog};
pub use repository::{InMemoryKeyValueStore, KeyValueStore, Storage, StorageError};
pub use state_store::{STATE_KEY, StateStore};
