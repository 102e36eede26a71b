//! `SQLite`-backed [`KeyValueStore`].
//!
//! Values live in a single `kv_store` table in `data/vigia.db` (override
//! with `VIGIA_DB_PATH`), so tickets and favorites survive restarts of
//! both the server and the terminal app.

use std::path::{Path, PathBuf};

use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{KeyValueStore, StorageError};

/// Default path for the key-value database.
pub const DEFAULT_DB_PATH: &str = "data/vigia.db";

/// Resolves the database path from `VIGIA_DB_PATH`, falling back to
/// [`DEFAULT_DB_PATH`].
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    std::env::var("VIGIA_DB_PATH").map_or_else(|_| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from)
}

/// A [`KeyValueStore`] persisted in `SQLite`.
pub struct SqliteStore {
    db: Box<dyn Database>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the parent directory cannot be created,
    /// the database cannot be opened, or schema creation fails.
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db =
            init_sqlite_rusqlite(Some(path)).map_err(|e| StorageError::Database(e.to_string()))?;

        db.exec_raw(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key         TEXT PRIMARY KEY,
                value       TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )",
        )
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        log::debug!("Opened key-value store at {}", path.display());

        Ok(Self { db })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT value FROM kv_store WHERE key = $1",
                &[DatabaseValue::String(key.to_string())],
            )
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        rows.first()
            .map(|row| row.to_value::<String>("value"))
            .transpose()
            .map_err(|e| StorageError::Database(e.to_string()))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .exec_raw_params(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at",
                &[
                    DatabaseValue::String(key.to_string()),
                    DatabaseValue::String(value.to_string()),
                    DatabaseValue::String(now),
                ],
            )
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = std::env::temp_dir().join(format!("vigia-kv-{}", uuid::Uuid::new_v4()));
        let path = dir.join("vigia.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            assert_eq!(store.get("k").await.unwrap(), None);
            store.put("k", "[1]").await.unwrap();
            store.put("k", "[1,2]").await.unwrap();
        }

        let store = SqliteStore::open(&path).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("[1,2]"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
