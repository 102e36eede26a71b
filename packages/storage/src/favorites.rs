//! Favorite lines for the "Minha Rota" screen.

use vigia_report_models::support::{FavoriteLine, LineStatus};

use crate::{FAVORITE_LINES_KEY, ListStore, StorageError};

fn line(
    id: &str,
    number: &str,
    name: &str,
    status: LineStatus,
    eta: &str,
    alerts: u32,
) -> FavoriteLine {
    FavoriteLine {
        id: id.to_string(),
        number: number.to_string(),
        name: name.to_string(),
        status,
        eta: eta.to_string(),
        active_alerts: alerts,
    }
}

/// Lines pinned before the user customizes the list.
#[must_use]
pub fn default_favorites() -> Vec<FavoriteLine> {
    vec![
        line("1", "4033", "Camargos / Centro", LineStatus::Safe, "5 min", 0),
        line(
            "2",
            "8207",
            "Maria Goretti / Estrela Dalva",
            LineStatus::Warning,
            "12 min",
            3,
        ),
        line(
            "3",
            "2104",
            "Nova Gameleira / BH Shopping",
            LineStatus::Safe,
            "8 min",
            1,
        ),
        line("4", "SC01A", "Contorno A", LineStatus::Critical, "2 min", 8),
    ]
}

/// Persisted favorite lines.
#[derive(Clone)]
pub struct Favorites {
    lists: ListStore,
}

impl Favorites {
    /// Creates the favorites store over `lists`.
    #[must_use]
    pub const fn new(lists: ListStore) -> Self {
        Self { lists }
    }

    /// Lists favorite lines.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    pub async fn list(&self) -> Result<Vec<FavoriteLine>, StorageError> {
        self.lists
            .load_or_seed(FAVORITE_LINES_KEY, default_favorites)
            .await
    }

    /// Pins a line. New lines start as SAFE with no alerts and no ETA.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingField`] for a blank number or name,
    /// [`StorageError::Duplicate`] if the number is already pinned, or
    /// another [`StorageError`] if the store fails.
    pub async fn add(&self, number: &str, name: &str) -> Result<FavoriteLine, StorageError> {
        let number = number.trim();
        let name = name.trim();
        if number.is_empty() {
            return Err(StorageError::MissingField { field: "number" });
        }
        if name.is_empty() {
            return Err(StorageError::MissingField { field: "name" });
        }

        let favorite = line(
            &uuid::Uuid::new_v4().to_string(),
            number,
            name,
            LineStatus::Safe,
            "",
            0,
        );

        let stored = favorite.clone();
        self.lists
            .update(FAVORITE_LINES_KEY, default_favorites, move |lines| {
                if lines
                    .iter()
                    .any(|l| l.number.eq_ignore_ascii_case(&stored.number))
                {
                    return Err(StorageError::Duplicate(format!("Line {}", stored.number)));
                }
                lines.push(stored);
                Ok(())
            })
            .await?;

        Ok(favorite)
    }

    /// Unpins the line with `number`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    pub async fn remove(&self, number: &str) -> Result<bool, StorageError> {
        let number = number.trim().to_string();
        self.lists
            .update(FAVORITE_LINES_KEY, default_favorites, move |lines| {
                let before = lines.len();
                lines.retain(|l| !l.number.eq_ignore_ascii_case(&number));
                Ok(lines.len() != before)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryStore;

    fn favorites() -> Favorites {
        Favorites::new(ListStore::new(Arc::new(MemoryStore::default())))
    }

    #[tokio::test]
    async fn seeded_with_four_lines() {
        let lines = favorites().list().await.unwrap();
        let numbers: Vec<_> = lines.iter().map(|l| l.number.as_str()).collect();
        assert_eq!(numbers, vec!["4033", "8207", "2104", "SC01A"]);
        assert_eq!(lines[3].status, LineStatus::Critical);
        assert_eq!(lines[3].active_alerts, 8);
    }

    #[tokio::test]
    async fn duplicate_numbers_are_rejected() {
        let favorites = favorites();
        let added = favorites.add("5201", "Dona Clara / Buritis").await.unwrap();
        assert_eq!(added.status, LineStatus::Safe);

        assert!(matches!(
            favorites.add("sc01a", "Contorno").await,
            Err(StorageError::Duplicate(_))
        ));
        assert_eq!(favorites.list().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn remove_reports_whether_found() {
        let favorites = favorites();
        assert!(favorites.remove("8207").await.unwrap());
        assert!(!favorites.remove("8207").await.unwrap());
        assert_eq!(favorites.list().await.unwrap().len(), 3);
    }
}
