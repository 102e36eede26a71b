//! Settings and privacy toggles.

use std::sync::Arc;

use vigia_report_models::support::Preferences;

use crate::{KeyValueStore, PREFERENCES_KEY, StorageError};

/// Persisted [`Preferences`].
#[derive(Clone)]
pub struct PreferencesStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferencesStore {
    /// Creates the preferences store over a backend.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads preferences, or the defaults if none were saved. Unknown or
    /// missing fields take their default value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails or the saved value is
    /// not a JSON object.
    pub async fn load(&self) -> Result<Preferences, StorageError> {
        match self.store.get(PREFERENCES_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Preferences::default()),
        }
    }

    /// Saves preferences, replacing the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    pub async fn save(&self, preferences: &Preferences) -> Result<(), StorageError> {
        self.store
            .put(PREFERENCES_KEY, &serde_json::to_string(preferences)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use vigia_report_models::support::FontSize;

    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn defaults_until_saved() {
        let prefs = PreferencesStore::new(Arc::new(MemoryStore::default()));
        let mut loaded = prefs.load().await.unwrap();
        assert_eq!(loaded, Preferences::default());

        loaded.camouflage_mode = true;
        loaded.font_size = FontSize::Large;
        prefs.save(&loaded).await.unwrap();

        let reloaded = prefs.load().await.unwrap();
        assert!(reloaded.camouflage_mode);
        assert_eq!(reloaded.font_size, FontSize::Large);
    }
}
