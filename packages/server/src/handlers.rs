//! HTTP handler functions for the Vigia Cidadã API.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;
use vigia_ai::analysis::{line_ranking_or_empty, regional_risk_or_empty};
use vigia_flow::discrete::DiscreteFlow;
use vigia_flow::form::DiscreteHandoff;
use vigia_flow::submission::{SubmissionState, spawn_submission};
use vigia_report_models::insights::{DEFAULT_CITY, DEFAULT_UF};
use vigia_report_models::registry::category_options;
use vigia_report_models::support::{Preferences, TicketKind};
use vigia_report_models::{ReportData, ReportDraft};
use vigia_server_models::{
    AddFavoriteRequest, ApiCategoryNode, ApiHealth, ApiSubmission, ApiSubmissionState,
    DiscreteReportRequest, OpenTicketRequest, RankingQueryParams, SubmitReportRequest,
};
use vigia_storage::StorageError;
use vigia_storage::support::DEFAULT_BUG_AREA;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/categories`
///
/// Returns the report categories, with the security sub-types nested
/// under SECURITY.
pub async fn categories() -> HttpResponse {
    let tree: Vec<ApiCategoryNode> = category_options()
        .iter()
        .map(ApiCategoryNode::from)
        .collect();

    HttpResponse::Ok().json(tree)
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// `POST /api/reports`
///
/// Validates and finalizes the draft, then starts the analysis and
/// answers `202` with the pending submission.
pub async fn submit_report(
    state: web::Data<AppState>,
    body: web::Json<SubmitReportRequest>,
) -> HttpResponse {
    let draft = ReportDraft::from(body.into_inner());

    match draft.finalize(Utc::now().timestamp_millis()) {
        Ok(report) => accept(&state, report).await,
        Err(e) => bad_request(&e),
    }
}

/// `POST /api/reports/discrete`
///
/// Turns the decoy comment into a SECURITY / HARASSMENT report.
pub async fn submit_discrete(
    state: web::Data<AppState>,
    body: web::Json<DiscreteReportRequest>,
) -> HttpResponse {
    let request = body.into_inner();
    let mut flow = DiscreteFlow::new(DiscreteHandoff {
        line_id: request.line_id,
        vehicle_id: request.vehicle_id,
        location: request.location,
    });
    flow.set_comment(request.comment);

    match flow.compose(Utc::now().timestamp_millis()) {
        Ok(report) => accept(&state, report).await,
        Err(e) => bad_request(&e),
    }
}

/// `GET /api/reports/{id}`
pub async fn report_status(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    let Ok(uuid) = Uuid::parse_str(&id) else {
        return not_found("Report not found");
    };

    match state.submissions.get(uuid).await {
        Some(submission) => HttpResponse::Ok().json(to_api_submission(id, &submission)),
        None => not_found("Report not found"),
    }
}

async fn accept(state: &AppState, report: ReportData) -> HttpResponse {
    let id = Uuid::new_v4();
    log::info!(
        "Report {id} accepted: {} on line '{}' (discrete: {})",
        report.category.label(),
        report.line_id,
        report.is_discrete
    );

    state.submissions.insert_pending(id).await;

    let pending = spawn_submission(state.analyst.clone(), report);
    let submissions = state.submissions.clone();
    actix_web::rt::spawn(async move {
        let settled = pending.resolve().await;
        submissions.settle(id, settled).await;
    });

    HttpResponse::Accepted().json(to_api_submission(id.to_string(), &SubmissionState::Pending))
}

fn to_api_submission(id: String, submission: &SubmissionState) -> ApiSubmission {
    let state = match submission {
        SubmissionState::Pending => ApiSubmissionState::Pending,
        SubmissionState::Resolved(_) => ApiSubmissionState::Resolved,
        SubmissionState::Fallback(_) => ApiSubmissionState::Fallback,
    };

    ApiSubmission {
        id,
        state,
        feedback: submission.feedback().cloned(),
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// `GET /api/stats/ranking`
///
/// Returns the AI-generated line ranking, or an empty list if the
/// analysis fails.
pub async fn ranking(
    state: web::Data<AppState>,
    params: web::Query<RankingQueryParams>,
) -> HttpResponse {
    let uf = params.uf.as_deref().unwrap_or(DEFAULT_UF);
    let city = params.city.as_deref().unwrap_or(DEFAULT_CITY);

    let ranking = line_ranking_or_empty(state.analyst.as_ref(), uf, city).await;
    HttpResponse::Ok().json(ranking)
}

/// `GET /api/stats/regions`
pub async fn regions(state: web::Data<AppState>) -> HttpResponse {
    let risk = regional_risk_or_empty(state.analyst.as_ref()).await;
    HttpResponse::Ok().json(risk)
}

// ---------------------------------------------------------------------------
// Support
// ---------------------------------------------------------------------------

fn ticket_kind(segment: &str) -> Option<TicketKind> {
    match segment {
        "contact" => Some(TicketKind::Contact),
        "bugs" => Some(TicketKind::Bug),
        _ => None,
    }
}

/// `GET /api/support/{contact|bugs}`
pub async fn list_tickets(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Some(kind) = ticket_kind(&path) else {
        return not_found("Unknown ticket type");
    };

    match state.support.tickets(kind).await {
        Ok(tickets) => HttpResponse::Ok().json(tickets),
        Err(e) => storage_error(&e),
    }
}

/// `POST /api/support/{contact|bugs}`
///
/// Bug reports without a subject are filed under the default app area.
pub async fn open_ticket(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<OpenTicketRequest>,
) -> HttpResponse {
    let Some(kind) = ticket_kind(&path) else {
        return not_found("Unknown ticket type");
    };
    let request = body.into_inner();
    let subject = match (kind, request.subject) {
        (_, Some(subject)) => subject,
        (TicketKind::Bug, None) => DEFAULT_BUG_AREA.to_string(),
        (TicketKind::Contact, None) => String::new(),
    };

    match state
        .support
        .open_ticket(kind, &subject, &request.message)
        .await
    {
        Ok(ticket) => HttpResponse::Created().json(ticket),
        Err(e) => storage_error(&e),
    }
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

/// `GET /api/favorites`
pub async fn list_favorites(state: web::Data<AppState>) -> HttpResponse {
    match state.favorites.list().await {
        Ok(lines) => HttpResponse::Ok().json(lines),
        Err(e) => storage_error(&e),
    }
}

/// `POST /api/favorites`
pub async fn add_favorite(
    state: web::Data<AppState>,
    body: web::Json<AddFavoriteRequest>,
) -> HttpResponse {
    match state.favorites.add(&body.number, &body.name).await {
        Ok(line) => HttpResponse::Created().json(line),
        Err(e) => storage_error(&e),
    }
}

/// `DELETE /api/favorites/{number}`
pub async fn remove_favorite(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.favorites.remove(&path).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => not_found("Favorite line not found"),
        Err(e) => storage_error(&e),
    }
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// `GET /api/preferences`
pub async fn get_preferences(state: web::Data<AppState>) -> HttpResponse {
    match state.preferences.load().await {
        Ok(preferences) => HttpResponse::Ok().json(preferences),
        Err(e) => storage_error(&e),
    }
}

/// `PUT /api/preferences`
pub async fn put_preferences(
    state: web::Data<AppState>,
    body: web::Json<Preferences>,
) -> HttpResponse {
    let preferences = body.into_inner();
    match state.preferences.save(&preferences).await {
        Ok(()) => HttpResponse::Ok().json(preferences),
        Err(e) => storage_error(&e),
    }
}

// ---------------------------------------------------------------------------
// Error responses
// ---------------------------------------------------------------------------

fn bad_request(e: &dyn std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": message }))
}

fn storage_error(e: &StorageError) -> HttpResponse {
    match e {
        StorageError::MissingField { .. } => bad_request(e),
        StorageError::Duplicate(_) => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": e.to_string() }))
        }
        StorageError::Database(_) | StorageError::Io(_) | StorageError::Json(_) => {
            log::error!("Storage error: {e}");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Storage failure" }))
        }
    }
}
