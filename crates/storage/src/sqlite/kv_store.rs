use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{KeyValueStore, StorageError};

use super::SqliteKeyValueStore;

fn write_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Database(db) => StorageError::Unavailable(db.to_string()),
        other => StorageError::Connection(other.to_string()),
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row
            .try_get("value")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        Ok(())
    }
}
