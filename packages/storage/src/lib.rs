#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Local key-value persistence for Vigia Cidadã.
//!
//! Every persisted collection is a JSON array stored under a single key,
//! overwritten wholesale on each change. Two backends implement
//! [`KeyValueStore`]: [`sqlite::SqliteStore`] for the server and terminal
//! app, and [`memory::MemoryStore`] for tests.
//!
//! Higher-level stores ([`support::SupportDesk`],
//! [`favorites::Favorites`], [`preferences::PreferencesStore`]) sit on top
//! of [`ListStore`], which serializes read-modify-write cycles so that two
//! concurrent updates cannot lose each other's writes.

pub mod favorites;
pub mod memory;
pub mod preferences;
pub mod sqlite;
pub mod support;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key holding "Fale conosco" tickets.
pub const SUPPORT_TICKETS_KEY: &str = "vigia_support_tickets";
/// Key holding bug reports.
pub const BUG_REPORTS_KEY: &str = "vigia_bug_reports";
/// Key holding favorite lines.
pub const FAVORITE_LINES_KEY: &str = "vigia_favorite_lines";
/// Key holding user preferences.
pub const PREFERENCES_KEY: &str = "vigia_preferences";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was blank.
    #[error("{field} is required")]
    MissingField {
        /// Name of the field.
        field: &'static str,
    },

    /// The record already exists.
    #[error("{0} already exists")]
    Duplicate(String),
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// A string key-value store.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// JSON lists
// ---------------------------------------------------------------------------

/// Typed JSON-array access over a [`KeyValueStore`].
#[derive(Clone)]
pub struct ListStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl ListStore {
    /// Wraps a backend.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Loads the list stored under `key`, or `None` if the key was never
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails or the stored value
    /// is not a JSON array of `T`.
    pub async fn load<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<Vec<T>>, StorageError> {
        match self.store.get(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Loads the list under `key`, writing `seed()` first if the key was
    /// never written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails or the stored value
    /// is malformed.
    pub async fn load_or_seed<T, F>(&self, key: &str, seed: F) -> Result<Vec<T>, StorageError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Vec<T> + Send,
    {
        if let Some(items) = self.load(key).await? {
            return Ok(items);
        }

        let _guard = self.write_lock.lock().await;
        // Another writer may have seeded while we waited.
        if let Some(items) = self.load(key).await? {
            return Ok(items);
        }

        let items = seed();
        log::debug!("Seeding {key} with {} item(s)", items.len());
        self.store.put(key, &serde_json::to_string(&items)?).await?;
        Ok(items)
    }

    /// Applies `f` to the list under `key` and writes the result back,
    /// holding the write lock for the whole cycle. A missing key starts
    /// from `seed()`.
    ///
    /// If `f` returns an error the list is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails, the stored value is
    /// malformed, or `f` rejects the change.
    pub async fn update<T, R, S, F>(&self, key: &str, seed: S, f: F) -> Result<R, StorageError>
    where
        T: Serialize + DeserializeOwned + Send,
        S: FnOnce() -> Vec<T> + Send,
        F: FnOnce(&mut Vec<T>) -> Result<R, StorageError> + Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load(key).await?.unwrap_or_else(seed);
        let result = f(&mut items)?;
        self.store.put(key, &serde_json::to_string(&items)?).await?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn lists() -> ListStore {
        ListStore::new(Arc::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn missing_key_loads_none() {
        let lists = lists();
        assert!(lists.load::<String>("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn seed_is_written_once() {
        let lists = lists();
        let first = lists
            .load_or_seed("k", || vec!["a".to_string()])
            .await
            .unwrap();
        let second = lists
            .load_or_seed("k", || vec!["b".to_string()])
            .await
            .unwrap();
        assert_eq!(first, vec!["a"]);
        assert_eq!(second, vec!["a"]);
    }

    #[tokio::test]
    async fn rejected_update_leaves_list_untouched() {
        let lists = lists();
        lists
            .update("k", Vec::new, |items: &mut Vec<u32>| {
                items.push(1);
                Ok(())
            })
            .await
            .unwrap();

        let err = lists
            .update("k", Vec::new, |items: &mut Vec<u32>| {
                items.push(2);
                Err::<(), _>(StorageError::Duplicate("2".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(_)));
        assert_eq!(lists.load::<u32>("k").await.unwrap(), Some(vec![1]));
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let lists = lists();
        let mut handles = Vec::new();
        for i in 0..20u32 {
            let lists = lists.clone();
            handles.push(tokio::spawn(async move {
                lists
                    .update("k", Vec::new, move |items: &mut Vec<u32>| {
                        items.push(i);
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(lists.load::<u32>("k").await.unwrap().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn malformed_value_is_an_error() {
        let store = Arc::new(MemoryStore::default());
        store.put("k", "not json").await.unwrap();
        let lists = ListStore::new(store);
        assert!(matches!(
            lists.load::<u32>("k").await,
            Err(StorageError::Json(_))
        ));
    }
}
