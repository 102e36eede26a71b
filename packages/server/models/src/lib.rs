#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the Vigia Cidadã server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain types so the wire contract can evolve independently.

use serde::{Deserialize, Serialize};
use vigia_report_models::registry::{CategoryOption, SecurityOption, security_options};
use vigia_report_models::{
    AnalysisFeedback, LocationData, MediaAttachment, ReportCategory, ReportDraft, SecurityType,
};

/// Server health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// A category in the taxonomy tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategoryNode {
    /// Wire name (e.g. `SECURITY`).
    pub category: ReportCategory,
    /// Display label.
    pub label: String,
    /// Icon reference.
    pub icon: String,
    /// Short description of what belongs here.
    pub description: String,
    /// Sub-types; only populated for SECURITY.
    pub security_options: Vec<ApiSecurityOption>,
}

/// A security sub-type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSecurityOption {
    /// Wire name (e.g. `HARASSMENT`).
    pub security_type: SecurityType,
    /// Display label.
    pub label: String,
    /// Icon reference.
    pub icon: String,
    /// Whether picking this option switches to discrete mode.
    pub trigger_discrete: bool,
}

impl From<&SecurityOption> for ApiSecurityOption {
    fn from(option: &SecurityOption) -> Self {
        Self {
            security_type: option.security_type,
            label: option.label.to_string(),
            icon: option.icon.to_string(),
            trigger_discrete: option.trigger_discrete,
        }
    }
}

impl From<&CategoryOption> for ApiCategoryNode {
    fn from(option: &CategoryOption) -> Self {
        let security_options = if option.category == ReportCategory::Security {
            security_options().iter().map(ApiSecurityOption::from).collect()
        } else {
            Vec::new()
        };

        Self {
            category: option.category,
            label: option.label.to_string(),
            icon: option.icon.to_string(),
            description: option.description.to_string(),
            security_options,
        }
    }
}

/// Body of `POST /api/reports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    /// Transit line.
    #[serde(default)]
    pub line_id: String,
    /// Vehicle number.
    #[serde(default)]
    pub vehicle_id: String,
    /// Report category.
    pub category: Option<ReportCategory>,
    /// Security sub-type.
    pub sub_category: Option<SecurityType>,
    /// Incident description.
    #[serde(default)]
    pub description: String,
    /// Position, if captured.
    pub location: Option<LocationData>,
    /// Evidence reference.
    pub media: Option<MediaAttachment>,
}

impl From<SubmitReportRequest> for ReportDraft {
    fn from(request: SubmitReportRequest) -> Self {
        Self {
            line_id: request.line_id,
            vehicle_id: request.vehicle_id,
            category: request.category,
            sub_category: request.sub_category,
            description: request.description,
            location: request.location,
            media: request.media,
            is_discrete: false,
        }
    }
}

/// Body of `POST /api/reports/discrete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscreteReportRequest {
    /// Transit line typed before switching to discrete mode.
    #[serde(default)]
    pub line_id: String,
    /// Vehicle typed before switching to discrete mode.
    #[serde(default)]
    pub vehicle_id: String,
    /// Position, if captured.
    pub location: Option<LocationData>,
    /// Text typed into the decoy comment box.
    #[serde(default)]
    pub comment: String,
}

/// Phase of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiSubmissionState {
    /// Analysis running.
    Pending,
    /// Analysis produced feedback.
    Resolved,
    /// Analysis failed; fallback feedback attached.
    Fallback,
}

/// A submitted report's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSubmission {
    /// Submission ID.
    pub id: String,
    /// Current phase.
    pub state: ApiSubmissionState,
    /// Feedback once settled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<AnalysisFeedback>,
}

/// Query parameters for the ranking endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingQueryParams {
    /// State abbreviation; defaults to `MG`.
    pub uf: Option<String>,
    /// City; defaults to `Belo Horizonte`.
    pub city: Option<String>,
}

/// Body of the ticket endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTicketRequest {
    /// Subject, or app area for bug reports (defaults to
    /// `Login / Cadastro`).
    pub subject: Option<String>,
    /// Message body.
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /api/favorites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    /// Line number.
    pub number: String,
    /// Route name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use vigia_report_models::registry::category_option;

    use super::*;

    #[test]
    fn only_security_has_children() {
        let security = ApiCategoryNode::from(category_option(ReportCategory::Security));
        assert_eq!(security.security_options.len(), 4);
        assert!(security.security_options[0].trigger_discrete);

        let service = ApiCategoryNode::from(category_option(ReportCategory::Service));
        assert!(service.security_options.is_empty());
    }

    #[test]
    fn report_request_parses_camel_case() {
        let request: SubmitReportRequest = serde_json::from_str(
            r#"{"lineId":"8207","vehicleId":"20456","category":"INFRASTRUCTURE","description":"Ar condicionado quebrado"}"#,
        )
        .unwrap();
        let draft = ReportDraft::from(request);
        assert_eq!(draft.category, Some(ReportCategory::Infrastructure));
        assert!(draft.is_submittable());
        assert!(!draft.is_discrete);
    }

    #[test]
    fn submission_omits_missing_feedback() {
        let json = serde_json::to_value(ApiSubmission {
            id: "x".to_string(),
            state: ApiSubmissionState::Pending,
            feedback: None,
        })
        .unwrap();
        assert_eq!(json["state"], "PENDING");
        assert!(json.get("feedback").is_none());
    }
}
