//! Top-level screen selection.
//!
//! [`View`] is a tagged union: each variant carries exactly the state its
//! screen needs, so the in-progress draft lives inside `Form`/`Discrete`
//! and feedback inside `Success`. Leaving a screen drops its state, which
//! is how reset clears the draft and feedback.

use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;
use uuid::Uuid;
use vigia_report_models::ReportData;

use crate::auth::LoginForm;
use crate::discrete::DiscreteFlow;
use crate::form::{DiscreteHandoff, ReportForm};
use crate::submission::SubmissionState;

/// Screens reachable with [`Action::Open`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    /// Line ranking
    Stats,
    /// Regional risk map
    Map,
    /// Favorite lines
    MyRoute,
    /// Profile hub
    Profile,
    /// Profile editing
    ProfileEdit,
    /// Badges and points
    Achievements,
    /// Privacy toggles
    PrivacySettings,
    /// App settings
    Settings,
    /// Contact and bug reports
    Support,
}

impl Screen {
    /// The screen `Back` returns to.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::ProfileEdit
            | Self::Achievements
            | Self::PrivacySettings
            | Self::Settings
            | Self::Support => Some(Self::Profile),
            Self::Stats | Self::Map | Self::MyRoute | Self::Profile => None,
        }
    }
}

/// The success screen: processing until the analysis settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessScreen {
    /// Acknowledged, analysis running.
    Processing {
        /// Identifies the submission whose result this screen waits for.
        ticket: Uuid,
    },
    /// Analysis settled.
    Result(SubmissionState),
}

/// The screen currently shown.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Sign in, register or recover password.
    Login(LoginForm),
    /// Terms of use, shown until accepted.
    Terms,
    /// Main menu, optionally with the promotional popup over it.
    Home {
        /// Whether the popup is showing.
        show_ad: bool,
    },
    /// Report wizard.
    Form(ReportForm),
    /// Disguised comment box.
    Discrete(DiscreteFlow),
    /// Submission acknowledgement and feedback.
    Success(SuccessScreen),
    /// A peripheral screen.
    Screen(Screen),
}

impl View {
    /// Screen name used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => "LOGIN",
            Self::Terms => "TERMS",
            Self::Home { .. } => "HOME",
            Self::Form(_) => "FORM",
            Self::Discrete(_) => "DISCRETE",
            Self::Success(_) => "SUCCESS",
            Self::Screen(screen) => (*screen).into(),
        }
    }

    const fn signed_in(&self) -> bool {
        !matches!(self, Self::Login(_) | Self::Terms)
    }
}

/// Things screens ask the router to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Login screen reports success.
    LoginSucceeded,
    /// Terms accepted.
    AcceptTerms,
    /// Back to the login screen.
    Logout,
    /// Close the promotional popup.
    DismissAd,
    /// Open the report wizard with an empty draft.
    StartReport,
    /// The wizard hands off to discrete mode.
    TriggerDiscrete(DiscreteHandoff),
    /// A finalized report was submitted.
    Submit(ReportData),
    /// The analysis for `ticket` settled.
    AnalysisResolved {
        /// Ticket returned by [`Dispatched::Submitted`].
        ticket: Uuid,
        /// Terminal state.
        state: SubmissionState,
    },
    /// Open a peripheral screen.
    Open(Screen),
    /// The back control of the current screen.
    Back,
    /// Return to Home, clearing draft and feedback.
    Reset,
}

impl Action {
    /// Action name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LoginSucceeded => "LoginSucceeded",
            Self::AcceptTerms => "AcceptTerms",
            Self::Logout => "Logout",
            Self::DismissAd => "DismissAd",
            Self::StartReport => "StartReport",
            Self::TriggerDiscrete(_) => "TriggerDiscrete",
            Self::Submit(_) => "Submit",
            Self::AnalysisResolved { .. } => "AnalysisResolved",
            Self::Open(_) => "Open",
            Self::Back => "Back",
            Self::Reset => "Reset",
        }
    }
}

/// What a dispatched action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The view changed (or was updated in place).
    Moved,
    /// The report was accepted; the analysis result must be delivered with
    /// this ticket.
    Submitted {
        /// Submission ticket.
        ticket: Uuid,
    },
    /// A late analysis result for a screen that is gone; nothing changed.
    Discarded,
}

/// An action that the current screen cannot perform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{action} is not available on {view}")]
pub struct RouterError {
    /// Action name.
    pub action: &'static str,
    /// Screen name.
    pub view: &'static str,
}

/// Single source of truth for the screen being shown.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRouter {
    view: View,
    terms_accepted: bool,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    /// Starts on the login screen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view: View::Login(LoginForm::default()),
            terms_accepted: false,
        }
    }

    /// Current view.
    #[must_use]
    pub const fn view(&self) -> &View {
        &self.view
    }

    /// Current view, for screens that edit their own state.
    pub const fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    /// The wizard, if it is on screen.
    pub const fn form_mut(&mut self) -> Option<&mut ReportForm> {
        match &mut self.view {
            View::Form(form) => Some(form),
            _ => None,
        }
    }

    /// The discrete flow, if it is on screen.
    pub const fn discrete_mut(&mut self) -> Option<&mut DiscreteFlow> {
        match &mut self.view {
            View::Discrete(flow) => Some(flow),
            _ => None,
        }
    }

    /// The login form, if it is on screen.
    pub const fn login_mut(&mut self) -> Option<&mut LoginForm> {
        match &mut self.view {
            View::Login(form) => Some(form),
            _ => None,
        }
    }

    /// Applies `action` to the current view.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError`] if the current screen cannot perform the
    /// action. The view is left unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<Dispatched, RouterError> {
        let from = self.view.name();
        let reject = |action: &Action| RouterError {
            action: action.name(),
            view: from,
        };

        let moved = Dispatched::Moved;
        let (next, outcome) = match (&self.view, action) {
            (View::Login(_), Action::LoginSucceeded) => {
                if self.terms_accepted {
                    (View::Home { show_ad: true }, moved)
                } else {
                    (View::Terms, moved)
                }
            }
            (View::Terms, Action::AcceptTerms) => {
                self.terms_accepted = true;
                (View::Home { show_ad: true }, moved)
            }
            (view, Action::Logout) if view.signed_in() => (View::Login(LoginForm::default()), moved),
            (View::Home { .. }, Action::DismissAd) => (View::Home { show_ad: false }, moved),
            (View::Home { .. }, Action::StartReport) => (View::Form(ReportForm::new()), moved),
            (View::Form(_), Action::TriggerDiscrete(handoff)) => {
                (View::Discrete(DiscreteFlow::new(handoff)), moved)
            }
            (View::Form(_) | View::Discrete(_), Action::Submit(report)) => {
                let ticket = Uuid::new_v4();
                log::info!(
                    "Report submitted from {from} (category {}, discrete: {}), ticket {ticket}",
                    report.category,
                    report.is_discrete
                );
                (
                    View::Success(SuccessScreen::Processing { ticket }),
                    Dispatched::Submitted { ticket },
                )
            }
            (
                View::Success(SuccessScreen::Processing { ticket: current }),
                Action::AnalysisResolved { ticket, state },
            ) if *current == ticket && !state.is_pending() => {
                (View::Success(SuccessScreen::Result(state)), moved)
            }
            (_, Action::AnalysisResolved { ticket, .. }) => {
                log::debug!("Discarding analysis result for {ticket}, {from} is showing");
                return Ok(Dispatched::Discarded);
            }
            (view, Action::Open(screen)) if view.signed_in() => (View::Screen(screen), moved),
            (View::Form(_) | View::Discrete(_) | View::Success(_), Action::Back) => {
                (View::Home { show_ad: false }, moved)
            }
            (View::Screen(screen), Action::Back) => (
                screen
                    .parent()
                    .map_or(View::Home { show_ad: false }, View::Screen),
                moved,
            ),
            (view, Action::Reset) if view.signed_in() => (View::Home { show_ad: false }, moved),
            (_, action) => return Err(reject(&action)),
        };

        log::debug!("{from} -> {}", next.name());
        self.view = next;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use vigia_report_models::{AnalysisFeedback, ReportCategory, ReportDraft};

    use super::*;

    fn signed_in() -> ViewRouter {
        let mut router = ViewRouter::new();
        router.dispatch(Action::LoginSucceeded).unwrap();
        router.dispatch(Action::AcceptTerms).unwrap();
        router.dispatch(Action::DismissAd).unwrap();
        router
    }

    fn report() -> ReportData {
        ReportDraft {
            category: Some(ReportCategory::Service),
            description: "Ônibus não parou".to_string(),
            ..ReportDraft::default()
        }
        .finalize(0)
        .unwrap()
    }

    #[test]
    fn first_login_shows_terms_then_home_with_ad() {
        let mut router = ViewRouter::new();
        router.dispatch(Action::LoginSucceeded).unwrap();
        assert_eq!(router.view(), &View::Terms);
        router.dispatch(Action::AcceptTerms).unwrap();
        assert_eq!(router.view(), &View::Home { show_ad: true });

        router.dispatch(Action::Logout).unwrap();
        router.dispatch(Action::LoginSucceeded).unwrap();
        assert_eq!(router.view(), &View::Home { show_ad: true });
    }

    #[test]
    fn discrete_requires_a_handoff_from_the_form() {
        let mut router = signed_in();
        let err = router
            .dispatch(Action::TriggerDiscrete(DiscreteHandoff::default()))
            .unwrap_err();
        assert_eq!(err.view, "HOME");

        router.dispatch(Action::StartReport).unwrap();
        router
            .dispatch(Action::TriggerDiscrete(DiscreteHandoff::default()))
            .unwrap();
        assert!(router.discrete_mut().is_some());
    }

    #[test]
    fn submit_is_only_accepted_from_form_or_discrete() {
        let mut router = signed_in();
        assert!(router.dispatch(Action::Submit(report())).is_err());
        assert_eq!(router.view(), &View::Home { show_ad: false });
    }

    #[test]
    fn submit_shows_processing_then_result() {
        let mut router = signed_in();
        router.dispatch(Action::StartReport).unwrap();
        let Dispatched::Submitted { ticket } = router.dispatch(Action::Submit(report())).unwrap()
        else {
            panic!("expected a ticket");
        };
        assert_eq!(
            router.view(),
            &View::Success(SuccessScreen::Processing { ticket })
        );

        router
            .dispatch(Action::AnalysisResolved {
                ticket,
                state: SubmissionState::fallback(),
            })
            .unwrap();
        assert_eq!(
            router.view(),
            &View::Success(SuccessScreen::Result(SubmissionState::Fallback(
                AnalysisFeedback::fallback()
            )))
        );
    }

    #[test]
    fn reset_clears_draft_and_feedback() {
        let mut router = signed_in();
        router.dispatch(Action::StartReport).unwrap();
        router.form_mut().unwrap().set_line_id("8207");
        let Dispatched::Submitted { ticket } = router.dispatch(Action::Submit(report())).unwrap()
        else {
            panic!("expected a ticket");
        };
        router
            .dispatch(Action::AnalysisResolved {
                ticket,
                state: SubmissionState::fallback(),
            })
            .unwrap();

        router.dispatch(Action::Reset).unwrap();
        assert_eq!(router.view(), &View::Home { show_ad: false });

        router.dispatch(Action::StartReport).unwrap();
        let form = router.form_mut().unwrap();
        assert_eq!(form.draft(), &ReportDraft::default());
    }

    #[test]
    fn late_result_after_leaving_is_discarded() {
        let mut router = signed_in();
        router.dispatch(Action::StartReport).unwrap();
        let Dispatched::Submitted { ticket } = router.dispatch(Action::Submit(report())).unwrap()
        else {
            panic!("expected a ticket");
        };
        router.dispatch(Action::Back).unwrap();

        let outcome = router
            .dispatch(Action::AnalysisResolved {
                ticket,
                state: SubmissionState::fallback(),
            })
            .unwrap();
        assert_eq!(outcome, Dispatched::Discarded);
        assert_eq!(router.view(), &View::Home { show_ad: false });
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut router = signed_in();
        router.dispatch(Action::StartReport).unwrap();
        router.dispatch(Action::Submit(report())).unwrap();

        let outcome = router
            .dispatch(Action::AnalysisResolved {
                ticket: Uuid::new_v4(),
                state: SubmissionState::fallback(),
            })
            .unwrap();
        assert_eq!(outcome, Dispatched::Discarded);
        assert!(matches!(
            router.view(),
            View::Success(SuccessScreen::Processing { .. })
        ));
    }

    #[test]
    fn back_from_form_and_discrete_goes_home() {
        let mut router = signed_in();
        router.dispatch(Action::StartReport).unwrap();
        router.dispatch(Action::Back).unwrap();
        assert_eq!(router.view(), &View::Home { show_ad: false });

        router.dispatch(Action::StartReport).unwrap();
        router
            .dispatch(Action::TriggerDiscrete(DiscreteHandoff::default()))
            .unwrap();
        router.dispatch(Action::Back).unwrap();
        assert_eq!(router.view(), &View::Home { show_ad: false });
    }

    #[test]
    fn peripheral_screens_return_to_parent() {
        let mut router = signed_in();
        router.dispatch(Action::Open(Screen::Profile)).unwrap();
        router.dispatch(Action::Open(Screen::Support)).unwrap();
        assert_eq!(router.view().name(), "SUPPORT");

        router.dispatch(Action::Back).unwrap();
        assert_eq!(router.view(), &View::Screen(Screen::Profile));
        router.dispatch(Action::Back).unwrap();
        assert_eq!(router.view(), &View::Home { show_ad: false });
    }

    #[test]
    fn screens_need_sign_in() {
        let mut router = ViewRouter::new();
        assert!(router.dispatch(Action::Open(Screen::Stats)).is_err());
        assert!(router.dispatch(Action::Reset).is_err());
        assert!(router.login_mut().is_some());
    }
}
