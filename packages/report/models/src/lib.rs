#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report taxonomy and shared data types for Vigia Cidadã.
//!
//! This crate defines the categories a passenger can report on, the
//! in-progress [`ReportDraft`] that the report wizard accumulates, the
//! finalized [`ReportData`] record, and the [`AnalysisFeedback`] returned
//! once a report has been analyzed. The static category registry lives in
//! [`registry`]; AI-generated aggregate types live in [`insights`] and the
//! locally persisted lists in [`support`].

pub mod insights;
pub mod registry;
pub mod support;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Top-level report categories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportCategory {
    /// Harassment, theft, aggression or suspicious behaviour on board.
    Security,
    /// Broken air conditioning, seats, cleanliness.
    Infrastructure,
    /// Delays, dangerous driving, skipped stops.
    Service,
}

impl ReportCategory {
    /// Short label shown on the category picker.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Security => "Segurança",
            Self::Infrastructure => "Infraestrutura",
            Self::Service => "Serviço",
        }
    }

    /// Upper-case tag used on badges and in analysis prompts.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Security => "SEGURANÇA",
            Self::Infrastructure => "INFRAESTRUTURA",
            Self::Service => "SERVIÇO",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Security, Self::Infrastructure, Self::Service]
    }
}

/// Sub-types of a [`ReportCategory::Security`] report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityType {
    /// Sexual or verbal harassment
    Harassment,
    /// Robbery or pickpocketing
    Theft,
    /// Physical aggression
    Aggression,
    /// Suspicious behaviour
    Suspicious,
}

impl SecurityType {
    /// Human-readable label, also used as the sub-category in prompts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Harassment => "Assédio",
            Self::Theft => "Roubo/Furto",
            Self::Aggression => "Agressão",
            Self::Suspicious => "Atitude Suspeita",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Harassment,
            Self::Theft,
            Self::Aggression,
            Self::Suspicious,
        ]
    }
}

/// A geographic position captured when the report was started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl LocationData {
    /// Creates a new location.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for LocationData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Optional evidence attached to a report. Only the reference travels with
/// the report; the file itself is never uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    /// Original file name.
    pub file_name: String,
    /// MIME type (`image/*` or `audio/*`).
    pub content_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Error returned when a [`ReportDraft`] cannot be finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    /// No category has been selected yet.
    #[error("report category has not been selected")]
    MissingCategory,
    /// The description is empty or whitespace.
    #[error("report description is required")]
    EmptyDescription,
    /// A sub-category was given for a category other than SECURITY.
    #[error("sub-category is only allowed for security reports")]
    UnexpectedSubCategory,
    /// The sub-category can only be reported through the discrete flow.
    #[error("{0} must be reported through the discrete flow")]
    DiscreteOnly(SecurityType),
}

/// The in-progress report accumulated across the wizard or discrete flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    /// Transit line as typed by the user (e.g. `8207`).
    pub line_id: String,
    /// Vehicle number painted on the bus.
    pub vehicle_id: String,
    /// Unset until step 1 completes.
    pub category: Option<ReportCategory>,
    /// Only set for non-discrete security reports.
    pub sub_category: Option<SecurityType>,
    /// Free-text account of the incident.
    pub description: String,
    /// Present only if geolocation succeeded.
    pub location: Option<LocationData>,
    /// Optional photo or audio reference.
    pub media: Option<MediaAttachment>,
    /// Whether the report was composed through the discrete interface.
    pub is_discrete: bool,
}

impl ReportDraft {
    /// Returns `true` when the draft has a category and a non-blank
    /// description.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.category.is_some() && !self.description.trim().is_empty()
    }

    /// Finalizes the draft into an immutable [`ReportData`].
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] if the category is unset, the description
    /// is blank, a non-security report carries a sub-category, or a
    /// discrete-only sub-category arrives outside the discrete flow.
    pub fn finalize(&self, timestamp: i64) -> Result<ReportData, DraftError> {
        let category = self.category.ok_or(DraftError::MissingCategory)?;
        if self.description.trim().is_empty() {
            return Err(DraftError::EmptyDescription);
        }
        if let Some(sub_category) = self.sub_category {
            if category != ReportCategory::Security {
                return Err(DraftError::UnexpectedSubCategory);
            }
            if !self.is_discrete && registry::security_option(sub_category).trigger_discrete {
                return Err(DraftError::DiscreteOnly(sub_category));
            }
        }

        Ok(ReportData {
            line_id: self.line_id.clone(),
            vehicle_id: self.vehicle_id.clone(),
            category,
            sub_category: self.sub_category,
            description: self.description.clone(),
            location: self.location,
            media: self.media.clone(),
            timestamp,
            is_discrete: self.is_discrete,
        })
    }
}

/// A submitted report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// Transit line.
    pub line_id: String,
    /// Vehicle number.
    pub vehicle_id: String,
    /// Report category.
    pub category: ReportCategory,
    /// Security sub-type, if any.
    pub sub_category: Option<SecurityType>,
    /// Incident description.
    pub description: String,
    /// Where the report was started, if known.
    pub location: Option<LocationData>,
    /// Evidence reference.
    pub media: Option<MediaAttachment>,
    /// Submission time in epoch milliseconds.
    pub timestamp: i64,
    /// Whether the discrete interface was used.
    pub is_discrete: bool,
}

/// Lowest valid analysis priority.
pub const MIN_PRIORITY: u8 = 1;
/// Highest valid analysis priority.
pub const MAX_PRIORITY: u8 = 5;

/// Result of analyzing a submitted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisFeedback {
    /// One-sentence summary for the operator dashboard.
    pub summary: String,
    /// 1 (low) to 5 (critical/emergency).
    pub priority: u8,
    /// Short immediate advice for the passenger.
    pub advice: String,
}

impl AnalysisFeedback {
    /// Feedback substituted whenever the analysis call fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            summary: "Denúncia recebida. Análise pendente.".to_string(),
            priority: 3,
            advice: "Obrigado por reportar. Mantenha-se seguro.".to_string(),
        }
    }

    /// Returns `true` if the priority is within 1-5.
    #[must_use]
    pub const fn has_valid_priority(&self) -> bool {
        self.priority >= MIN_PRIORITY && self.priority <= MAX_PRIORITY
    }

    /// High-priority feedback (4 or 5) is highlighted on the success screen.
    #[must_use]
    pub const fn is_urgent(&self) -> bool {
        self.priority >= 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infrastructure_draft() -> ReportDraft {
        ReportDraft {
            line_id: "8207".to_string(),
            vehicle_id: "20456".to_string(),
            category: Some(ReportCategory::Infrastructure),
            description: "Ar condicionado quebrado".to_string(),
            ..ReportDraft::default()
        }
    }

    #[test]
    fn empty_draft_is_not_submittable() {
        assert!(!ReportDraft::default().is_submittable());
        assert_eq!(
            ReportDraft::default().finalize(0),
            Err(DraftError::MissingCategory)
        );
    }

    #[test]
    fn blank_description_is_rejected() {
        let draft = ReportDraft {
            description: "   ".to_string(),
            ..infrastructure_draft()
        };
        assert!(!draft.is_submittable());
        assert_eq!(draft.finalize(0), Err(DraftError::EmptyDescription));
    }

    #[test]
    fn sub_category_requires_security() {
        let draft = ReportDraft {
            sub_category: Some(SecurityType::Theft),
            ..infrastructure_draft()
        };
        assert_eq!(draft.finalize(0), Err(DraftError::UnexpectedSubCategory));
    }

    #[test]
    fn harassment_outside_discrete_flow_is_rejected() {
        let mut draft = ReportDraft {
            category: Some(ReportCategory::Security),
            sub_category: Some(SecurityType::Harassment),
            ..infrastructure_draft()
        };
        assert_eq!(
            draft.finalize(0),
            Err(DraftError::DiscreteOnly(SecurityType::Harassment))
        );

        draft.is_discrete = true;
        assert!(draft.finalize(0).is_ok());

        draft.is_discrete = false;
        draft.sub_category = Some(SecurityType::Aggression);
        assert_eq!(
            draft.finalize(0).unwrap().sub_category,
            Some(SecurityType::Aggression)
        );
    }

    #[test]
    fn finalize_copies_fields() {
        let report = infrastructure_draft().finalize(1_700_000_000_000).unwrap();
        assert_eq!(report.line_id, "8207");
        assert_eq!(report.vehicle_id, "20456");
        assert_eq!(report.category, ReportCategory::Infrastructure);
        assert_eq!(report.sub_category, None);
        assert_eq!(report.location, None);
        assert_eq!(report.timestamp, 1_700_000_000_000);
        assert!(!report.is_discrete);
    }

    #[test]
    fn fallback_feedback_is_fixed() {
        let feedback = AnalysisFeedback::fallback();
        assert_eq!(feedback.summary, "Denúncia recebida. Análise pendente.");
        assert_eq!(feedback.priority, 3);
        assert_eq!(feedback.advice, "Obrigado por reportar. Mantenha-se seguro.");
        assert!(feedback.has_valid_priority());
        assert!(!feedback.is_urgent());
    }

    #[test]
    fn report_serializes_with_camel_case_fields() {
        let mut draft = infrastructure_draft();
        draft.category = Some(ReportCategory::Security);
        draft.sub_category = Some(SecurityType::Theft);
        let json = serde_json::to_value(draft.finalize(5).unwrap()).unwrap();
        assert_eq!(json["lineId"], "8207");
        assert_eq!(json["category"], "SECURITY");
        assert_eq!(json["subCategory"], "THEFT");
        assert_eq!(json["isDiscrete"], false);
    }

    #[test]
    fn category_parses_from_wire_name() {
        assert_eq!(
            "INFRASTRUCTURE".parse::<ReportCategory>().unwrap(),
            ReportCategory::Infrastructure
        );
        assert!("SEGURANÇA".parse::<ReportCategory>().is_err());
    }
}
