#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for Vigia Cidadã.
//!
//! Accepts incident reports (regular and discrete), answers immediately
//! with a pending submission and runs the AI analysis in the background.
//! Also serves the line ranking, the regional risk view, support tickets,
//! favorite lines and user preferences. Local data is persisted in a
//! `SQLite` key-value table at `data/vigia.db` (override with
//! `VIGIA_DB_PATH`).

mod handlers;
pub mod interactive;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use tokio::sync::RwLock;
use uuid::Uuid;
use vigia_ai::analysis::{TransitAnalyst, analyst_from_env};
use vigia_flow::submission::SubmissionState;
use vigia_storage::favorites::Favorites;
use vigia_storage::preferences::PreferencesStore;
use vigia_storage::sqlite::{SqliteStore, db_path_from_env};
use vigia_storage::support::SupportDesk;
use vigia_storage::{KeyValueStore, ListStore};

/// Submissions remembered by default; older ones are forgotten first.
pub const MAX_TRACKED_SUBMISSIONS: usize = 1_000;

#[derive(Debug, Default)]
struct Entries {
    states: HashMap<Uuid, SubmissionState>,
    order: VecDeque<Uuid>,
}

/// The most recent submissions, keyed by the ID returned to the client.
///
/// Holds at most `capacity` entries. Inserting past that evicts the
/// oldest submission, pending or not, and a late result for an evicted
/// submission is dropped.
#[derive(Debug, Clone)]
pub struct SubmissionLog {
    entries: Arc<RwLock<Entries>>,
    capacity: usize,
}

impl Default for SubmissionLog {
    fn default() -> Self {
        Self::with_capacity(MAX_TRACKED_SUBMISSIONS)
    }
}

impl SubmissionLog {
    /// Creates a log that remembers at most `capacity` submissions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    /// Records a new submission in the pending state.
    pub async fn insert_pending(&self, id: Uuid) {
        let mut entries = self.entries.write().await;
        if entries.states.insert(id, SubmissionState::Pending).is_none() {
            entries.order.push_back(id);
        }

        while entries.order.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.states.remove(&oldest);
            log::debug!("Forgetting submission {oldest}");
        }
    }

    /// Stores the terminal state of a submission still being tracked.
    pub async fn settle(&self, id: Uuid, state: SubmissionState) {
        if let Some(slot) = self.entries.write().await.states.get_mut(&id) {
            *slot = state;
        } else {
            log::debug!("Submission {id} settled after being forgotten");
        }
    }

    /// Current state of a submission, if it is still tracked.
    pub async fn get(&self, id: Uuid) -> Option<SubmissionState> {
        self.entries.read().await.states.get(&id).cloned()
    }
}

/// Shared application state.
pub struct AppState {
    /// Report analysis, ranking and regional risk.
    pub analyst: Arc<dyn TransitAnalyst>,
    /// Contact and bug tickets.
    pub support: SupportDesk,
    /// Favorite lines.
    pub favorites: Favorites,
    /// Settings and privacy toggles.
    pub preferences: PreferencesStore,
    /// Accepted report submissions.
    pub submissions: SubmissionLog,
}

impl AppState {
    /// Builds the state over a single key-value backend.
    #[must_use]
    pub fn new(analyst: Arc<dyn TransitAnalyst>, store: Arc<dyn KeyValueStore>) -> Self {
        let lists = ListStore::new(store.clone());

        Self {
            analyst,
            support: SupportDesk::new(lists.clone()),
            favorites: Favorites::new(lists),
            preferences: PreferencesStore::new(store),
            submissions: SubmissionLog::default(),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/reports", web::post().to(handlers::submit_report))
            .route("/reports/discrete", web::post().to(handlers::submit_discrete))
            .route("/reports/{id}", web::get().to(handlers::report_status))
            .route("/stats/ranking", web::get().to(handlers::ranking))
            .route("/stats/regions", web::get().to(handlers::regions))
            .route("/support/{kind}", web::get().to(handlers::list_tickets))
            .route("/support/{kind}", web::post().to(handlers::open_ticket))
            .route("/favorites", web::get().to(handlers::list_favorites))
            .route("/favorites", web::post().to(handlers::add_favorite))
            .route("/favorites/{number}", web::delete().to(handlers::remove_favorite))
            .route("/preferences", web::get().to(handlers::get_preferences))
            .route("/preferences", web::put().to(handlers::put_preferences)),
    );
}

/// Starts the Vigia Cidadã API server.
///
/// Opens the `SQLite` store, builds the analyst from the AI provider
/// environment variables and starts the Actix-Web HTTP server. The caller
/// is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the store cannot be opened, or
/// if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let db_path = db_path_from_env();
    log::info!("Opening store at {}...", db_path.display());
    let store = SqliteStore::open(&db_path)
        .await
        .map_err(std::io::Error::other)?;

    let state = web::Data::new(AppState::new(analyst_from_env(), Arc::new(store)));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn submission_log_keeps_only_the_newest() {
        let log = SubmissionLog::with_capacity(2);
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            log.insert_pending(*id).await;
        }

        assert_eq!(log.get(ids[0]).await, None);
        assert_eq!(log.get(ids[1]).await, Some(SubmissionState::Pending));
        assert_eq!(log.get(ids[2]).await, Some(SubmissionState::Pending));

        log.settle(ids[0], SubmissionState::fallback()).await;
        assert_eq!(log.get(ids[0]).await, None);

        log.settle(ids[2], SubmissionState::fallback()).await;
        assert_eq!(log.get(ids[2]).await, Some(SubmissionState::fallback()));
    }

    #[actix_web::test]
    async fn reinserting_does_not_grow_the_log() {
        let log = SubmissionLog::with_capacity(2);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        log.insert_pending(first).await;
        log.insert_pending(first).await;
        log.insert_pending(second).await;

        assert!(log.get(first).await.is_some());
        assert!(log.get(second).await.is_some());
    }
}
