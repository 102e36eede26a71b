#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Screen flows for Vigia Cidadã.
//!
//! Everything here is a plain state machine: the report wizard
//! ([`form::ReportForm`]), the disguised comment box
//! ([`discrete::DiscreteFlow`]), the login screen ([`auth::LoginForm`])
//! and the top-level [`router::ViewRouter`]. The two asynchronous
//! boundaries, geolocation and report analysis, are injected as traits
//! ([`geolocation::Geolocator`] and [`vigia_ai::analysis::TransitAnalyst`])
//! so front ends decide how to run them.

pub mod auth;
pub mod discrete;
pub mod form;
pub mod geolocation;
pub mod router;
pub mod submission;

use thiserror::Error;
use vigia_report_models::DraftError;

use crate::form::FormStep;

/// Errors from the report and discrete flows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The action belongs to a different wizard step.
    #[error("action requires step {expected}, current step is {actual}")]
    WrongStep {
        /// Step the action belongs to.
        expected: FormStep,
        /// Step the wizard is on.
        actual: FormStep,
    },

    /// A security option was picked without selecting SECURITY first.
    #[error("security options are only available for the SECURITY category")]
    SecurityNotSelected,

    /// The discrete comment is blank.
    #[error("comment is required")]
    EmptyComment,

    /// The discrete comment is already being published.
    #[error("comment is already being published")]
    AlreadyPublishing,

    /// The draft could not be finalized.
    #[error(transparent)]
    Draft(#[from] DraftError),
}
