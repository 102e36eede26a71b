//! The two-step report wizard.
//!
//! Step 1 collects line, vehicle and category; picking SECURITY keeps the
//! wizard on step 1 and reveals the security sub-types. Step 2 collects
//! the description and optional evidence. A security option flagged
//! `trigger_discrete` leaves the wizard entirely and hands the partial
//! draft to the discrete flow.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use vigia_report_models::registry::security_option;
use vigia_report_models::{
    LocationData, MediaAttachment, ReportCategory, ReportData, ReportDraft, SecurityType,
};

use crate::FlowError;

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FormStep {
    /// Line, vehicle and category.
    VehicleAndCategory,
    /// Description and evidence.
    Details,
}

/// Outcome of the one-shot location request fired on wizard entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationStatus {
    /// Request in flight.
    Locating,
    /// Position captured and stored on the draft.
    Captured(LocationData),
    /// Denied, unsupported or failed. The report goes without coordinates.
    Unavailable,
}

/// What the wizard shows after a category was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelection {
    /// Moved on to the description step.
    Details,
    /// Still on step 1, now listing the security sub-types.
    SecurityOptions,
}

/// Partial draft forwarded to the discrete flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscreteHandoff {
    /// Transit line typed so far.
    pub line_id: String,
    /// Vehicle typed so far.
    pub vehicle_id: String,
    /// Position, if it was captured before the handoff.
    pub location: Option<LocationData>,
}

/// What happened after a security option was picked.
#[derive(Debug, Clone, PartialEq)]
pub enum SecurityChoice {
    /// Moved on to the description step.
    Details,
    /// The wizard is done; continue in the discrete flow.
    Discrete(DiscreteHandoff),
}

/// State of the report wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportForm {
    draft: ReportDraft,
    step: FormStep,
    location: LocationStatus,
}

impl Default for ReportForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportForm {
    /// A fresh wizard: empty draft, step 1, location request in flight.
    #[must_use]
    pub fn new() -> Self {
        Self {
            draft: ReportDraft::default(),
            step: FormStep::VehicleAndCategory,
            location: LocationStatus::Locating,
        }
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> FormStep {
        self.step
    }

    /// The draft accumulated so far.
    #[must_use]
    pub const fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    /// State of the location request.
    #[must_use]
    pub const fn location_status(&self) -> LocationStatus {
        self.location
    }

    /// Whether the security sub-type list is on screen.
    #[must_use]
    pub fn shows_security_options(&self) -> bool {
        self.step == FormStep::VehicleAndCategory
            && self.draft.category == Some(ReportCategory::Security)
    }

    /// Records the result of the location request. Only the first result
    /// counts; there is no retry.
    pub fn apply_location(&mut self, position: Option<LocationData>) {
        if self.location != LocationStatus::Locating {
            log::debug!("Ignoring location result, request already resolved");
            return;
        }

        if let Some(position) = position {
            log::debug!("Location captured: {position}");
            self.draft.location = Some(position);
            self.location = LocationStatus::Captured(position);
        } else {
            log::warn!("Location unavailable, continuing without coordinates");
            self.location = LocationStatus::Unavailable;
        }
    }

    /// Sets the transit line.
    pub fn set_line_id(&mut self, line_id: impl Into<String>) {
        self.draft.line_id = line_id.into();
    }

    /// Sets the vehicle number.
    pub fn set_vehicle_id(&mut self, vehicle_id: impl Into<String>) {
        self.draft.vehicle_id = vehicle_id.into();
    }

    /// Picks a category on step 1.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::WrongStep`] when not on step 1.
    pub fn select_category(
        &mut self,
        category: ReportCategory,
    ) -> Result<CategorySelection, FlowError> {
        self.require_step(FormStep::VehicleAndCategory)?;

        self.draft.category = Some(category);
        self.draft.sub_category = None;

        if category == ReportCategory::Security {
            Ok(CategorySelection::SecurityOptions)
        } else {
            self.step = FormStep::Details;
            Ok(CategorySelection::Details)
        }
    }

    /// Clears the category and sub-category and returns to step 1.
    pub fn change_category(&mut self) {
        self.draft.category = None;
        self.draft.sub_category = None;
        self.step = FormStep::VehicleAndCategory;
    }

    /// Picks a security sub-type.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::WrongStep`] when not on step 1, or
    /// [`FlowError::SecurityNotSelected`] if SECURITY is not the current
    /// category.
    pub fn select_security_option(
        &mut self,
        security_type: SecurityType,
    ) -> Result<SecurityChoice, FlowError> {
        self.require_step(FormStep::VehicleAndCategory)?;
        if self.draft.category != Some(ReportCategory::Security) {
            return Err(FlowError::SecurityNotSelected);
        }

        if security_option(security_type).trigger_discrete {
            log::debug!("{security_type} selected, switching to discrete mode");
            return Ok(SecurityChoice::Discrete(self.handoff()));
        }

        self.draft.sub_category = Some(security_type);
        self.step = FormStep::Details;
        Ok(SecurityChoice::Details)
    }

    /// The partial draft handed to the discrete flow. Category and
    /// sub-category are not carried.
    #[must_use]
    pub fn handoff(&self) -> DiscreteHandoff {
        DiscreteHandoff {
            line_id: self.draft.line_id.clone(),
            vehicle_id: self.draft.vehicle_id.clone(),
            location: self.draft.location,
        }
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Attaches or removes the evidence reference.
    pub fn attach_media(&mut self, media: Option<MediaAttachment>) {
        self.draft.media = media;
    }

    /// Whether the submit button is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.step == FormStep::Details && self.draft.is_submittable()
    }

    /// Finalizes the draft into a report stamped with `now` (epoch millis).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::WrongStep`] when not on step 2, or
    /// [`FlowError::Draft`] if the description is blank.
    pub fn submit(&self, now: i64) -> Result<ReportData, FlowError> {
        self.require_step(FormStep::Details)?;

        let mut report = self.draft.finalize(now)?;
        report.is_discrete = false;
        Ok(report)
    }

    fn require_step(&self, expected: FormStep) -> Result<(), FlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(FlowError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use vigia_report_models::DraftError;

    use super::*;

    #[test]
    fn starts_empty_on_step_one_while_locating() {
        let form = ReportForm::new();
        assert_eq!(form.step(), FormStep::VehicleAndCategory);
        assert_eq!(form.draft(), &ReportDraft::default());
        assert_eq!(form.location_status(), LocationStatus::Locating);
    }

    #[test]
    fn non_security_categories_go_straight_to_details() {
        for category in [ReportCategory::Infrastructure, ReportCategory::Service] {
            let mut form = ReportForm::new();
            assert_eq!(
                form.select_category(category).unwrap(),
                CategorySelection::Details
            );
            assert_eq!(form.step(), FormStep::Details);
            assert_eq!(form.draft().sub_category, None);
        }
    }

    #[test]
    fn security_stays_on_step_one() {
        let mut form = ReportForm::new();
        assert_eq!(
            form.select_category(ReportCategory::Security).unwrap(),
            CategorySelection::SecurityOptions
        );
        assert_eq!(form.step(), FormStep::VehicleAndCategory);
        assert!(form.shows_security_options());
    }

    #[test]
    fn harassment_always_hands_off_to_discrete() {
        let mut form = ReportForm::new();
        form.set_line_id("4033");
        form.set_vehicle_id("11234");
        form.apply_location(Some(LocationData::new(-19.9167, -43.9345)));
        form.select_category(ReportCategory::Security).unwrap();

        let choice = form.select_security_option(SecurityType::Harassment).unwrap();
        assert_eq!(
            choice,
            SecurityChoice::Discrete(DiscreteHandoff {
                line_id: "4033".to_string(),
                vehicle_id: "11234".to_string(),
                location: Some(LocationData::new(-19.9167, -43.9345)),
            })
        );
        assert_eq!(form.step(), FormStep::VehicleAndCategory);
    }

    #[test]
    fn other_security_options_go_to_details_with_sub_category() {
        for security_type in [
            SecurityType::Theft,
            SecurityType::Aggression,
            SecurityType::Suspicious,
        ] {
            let mut form = ReportForm::new();
            form.select_category(ReportCategory::Security).unwrap();
            assert_eq!(
                form.select_security_option(security_type).unwrap(),
                SecurityChoice::Details
            );
            assert_eq!(form.step(), FormStep::Details);
            assert_eq!(form.draft().category, Some(ReportCategory::Security));
            assert_eq!(form.draft().sub_category, Some(security_type));
        }
    }

    #[test]
    fn security_option_requires_security_category() {
        let mut form = ReportForm::new();
        assert_eq!(
            form.select_security_option(SecurityType::Theft),
            Err(FlowError::SecurityNotSelected)
        );
    }

    #[test]
    fn change_category_clears_selection() {
        let mut form = ReportForm::new();
        form.select_category(ReportCategory::Security).unwrap();
        form.change_category();
        assert_eq!(form.draft().category, None);
        assert!(!form.shows_security_options());
    }

    #[test]
    fn infrastructure_report_without_location() {
        let mut form = ReportForm::new();
        form.set_line_id("8207");
        form.set_vehicle_id("20456");
        form.apply_location(None);
        form.select_category(ReportCategory::Infrastructure).unwrap();
        form.set_description("Ar condicionado quebrado");

        let report = form.submit(1_760_000_000_000).unwrap();
        assert_eq!(report.line_id, "8207");
        assert_eq!(report.vehicle_id, "20456");
        assert_eq!(report.category, ReportCategory::Infrastructure);
        assert_eq!(report.description, "Ar condicionado quebrado");
        assert_eq!(report.location, None);
        assert!(!report.is_discrete);
        assert_eq!(report.timestamp, 1_760_000_000_000);
    }

    #[test]
    fn captured_location_is_carried_exactly() {
        let mut form = ReportForm::new();
        form.apply_location(Some(LocationData::new(-19.9167, -43.9345)));
        form.select_category(ReportCategory::Service).unwrap();
        form.set_description("Motorista passou direto do ponto");

        let report = form.submit(0).unwrap();
        let location = report.location.unwrap();
        assert!((location.latitude - -19.9167).abs() < f64::EPSILON);
        assert!((location.longitude - -43.9345).abs() < f64::EPSILON);
    }

    #[test]
    fn only_first_location_result_counts() {
        let mut form = ReportForm::new();
        form.apply_location(None);
        form.apply_location(Some(LocationData::new(1.0, 2.0)));
        assert_eq!(form.location_status(), LocationStatus::Unavailable);
        assert_eq!(form.draft().location, None);
    }

    #[test]
    fn blank_description_blocks_submit() {
        let mut form = ReportForm::new();
        form.select_category(ReportCategory::Service).unwrap();
        form.set_description("   ");
        assert!(!form.can_submit());
        assert_eq!(
            form.submit(0),
            Err(FlowError::Draft(DraftError::EmptyDescription))
        );
    }

    #[test]
    fn submit_on_step_one_is_rejected() {
        let form = ReportForm::new();
        assert!(matches!(
            form.submit(0),
            Err(FlowError::WrongStep {
                expected: FormStep::Details,
                ..
            })
        ));
    }

    #[test]
    fn media_is_carried_on_the_report() {
        let mut form = ReportForm::new();
        form.select_category(ReportCategory::Infrastructure).unwrap();
        form.set_description("Banco solto");
        form.attach_media(Some(MediaAttachment {
            file_name: "banco.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: 52_000,
        }));
        let report = form.submit(0).unwrap();
        assert_eq!(report.media.unwrap().file_name, "banco.jpg");
    }
}
