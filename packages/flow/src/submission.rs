//! Optimistic report submission.
//!
//! A submitted report is acknowledged immediately as
//! [`SubmissionState::Pending`]; the single analysis attempt runs in the
//! background and always ends in `Resolved` or `Fallback`, never in an
//! error.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use vigia_ai::analysis::TransitAnalyst;
use vigia_report_models::{AnalysisFeedback, ReportData};

/// Two-phase state of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "feedback", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionState {
    /// Analysis still running.
    Pending,
    /// Analysis returned usable feedback.
    Resolved(AnalysisFeedback),
    /// Analysis failed; carries [`AnalysisFeedback::fallback`].
    Fallback(AnalysisFeedback),
}

impl SubmissionState {
    /// The fallback terminal state.
    #[must_use]
    pub fn fallback() -> Self {
        Self::Fallback(AnalysisFeedback::fallback())
    }

    /// Feedback once the submission has settled.
    #[must_use]
    pub const fn feedback(&self) -> Option<&AnalysisFeedback> {
        match self {
            Self::Pending => None,
            Self::Resolved(feedback) | Self::Fallback(feedback) => Some(feedback),
        }
    }

    /// Whether the analysis is still running.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Runs exactly one analysis attempt, substituting the fallback feedback
/// on any failure.
pub async fn analyze_with_fallback(
    analyst: &dyn TransitAnalyst,
    report: &ReportData,
) -> SubmissionState {
    match analyst.analyze_report(report).await {
        Ok(feedback) if feedback.has_valid_priority() => {
            log::info!(
                "Report analyzed: priority {} ({})",
                feedback.priority,
                feedback.summary
            );
            SubmissionState::Resolved(feedback)
        }
        Ok(feedback) => {
            log::warn!(
                "Analysis returned priority {} outside 1-5, using fallback",
                feedback.priority
            );
            SubmissionState::fallback()
        }
        Err(e) => {
            log::error!("Error analyzing report: {e}");
            SubmissionState::fallback()
        }
    }
}

/// Handle to a submission whose analysis runs in the background.
///
/// Dropping the handle discards the result.
#[derive(Debug)]
pub struct PendingSubmission {
    rx: oneshot::Receiver<SubmissionState>,
}

impl PendingSubmission {
    /// Waits for the terminal state. A background task that died without
    /// reporting resolves to the fallback.
    pub async fn resolve(self) -> SubmissionState {
        self.rx.await.unwrap_or_else(|_| {
            log::error!("Analysis task ended without a result, using fallback");
            SubmissionState::fallback()
        })
    }

    /// Returns the terminal state if it is already available.
    pub fn try_resolve(&mut self) -> Option<SubmissionState> {
        match self.rx.try_recv() {
            Ok(state) => Some(state),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                log::error!("Analysis task ended without a result, using fallback");
                Some(SubmissionState::fallback())
            }
        }
    }
}

/// Starts the analysis of `report` on the current runtime and returns
/// without waiting for it.
#[must_use]
pub fn spawn_submission(analyst: Arc<dyn TransitAnalyst>, report: ReportData) -> PendingSubmission {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let state = analyze_with_fallback(analyst.as_ref(), &report).await;
        if tx.send(state).is_err() {
            log::debug!("Submission result discarded, screen was left");
        }
    });

    PendingSubmission { rx }
}

#[cfg(test)]
mod tests {
    use vigia_ai::AiError;
    use vigia_report_models::insights::{LineRanking, RegionalRisk};
    use vigia_report_models::{ReportCategory, ReportDraft};

    use super::*;

    /// Analyst returning a fixed outcome.
    enum StubAnalyst {
        Ok(AnalysisFeedback),
        Fail,
        Panic,
    }

    #[async_trait::async_trait]
    impl TransitAnalyst for StubAnalyst {
        async fn analyze_report(&self, _report: &ReportData) -> Result<AnalysisFeedback, AiError> {
            match self {
                Self::Ok(feedback) => Ok(feedback.clone()),
                Self::Fail => Err(AiError::EmptyResponse),
                Self::Panic => panic!("analyst crashed"),
            }
        }

        async fn line_ranking(&self, _uf: &str, _city: &str) -> Result<LineRanking, AiError> {
            Err(AiError::EmptyResponse)
        }

        async fn regional_risk(&self) -> Result<RegionalRisk, AiError> {
            Err(AiError::EmptyResponse)
        }
    }

    fn feedback(priority: u8) -> AnalysisFeedback {
        AnalysisFeedback {
            summary: "Ar-condicionado com defeito".to_string(),
            priority,
            advice: "Informe o motorista".to_string(),
        }
    }

    fn report() -> ReportData {
        ReportDraft {
            line_id: "8207".to_string(),
            vehicle_id: "20456".to_string(),
            category: Some(ReportCategory::Infrastructure),
            description: "Ar condicionado quebrado".to_string(),
            ..ReportDraft::default()
        }
        .finalize(0)
        .unwrap()
    }

    #[tokio::test]
    async fn successful_analysis_resolves() {
        let state = analyze_with_fallback(&StubAnalyst::Ok(feedback(2)), &report()).await;
        assert_eq!(state, SubmissionState::Resolved(feedback(2)));
    }

    #[tokio::test]
    async fn failed_analysis_falls_back() {
        let state = analyze_with_fallback(&StubAnalyst::Fail, &report()).await;
        let feedback = state.feedback().unwrap();
        assert_eq!(feedback.summary, "Denúncia recebida. Análise pendente.");
        assert_eq!(feedback.priority, 3);
        assert_eq!(feedback.advice, "Obrigado por reportar. Mantenha-se seguro.");
    }

    #[tokio::test]
    async fn out_of_range_priority_falls_back() {
        for priority in [0, 6, 200] {
            let state = analyze_with_fallback(&StubAnalyst::Ok(feedback(priority)), &report()).await;
            assert_eq!(state, SubmissionState::fallback());
        }
    }

    #[tokio::test]
    async fn spawned_submission_resolves() {
        let pending = spawn_submission(Arc::new(StubAnalyst::Ok(feedback(5))), report());
        let state = pending.resolve().await;
        assert!(state.feedback().unwrap().is_urgent());
    }

    #[tokio::test]
    async fn crashed_task_still_falls_back() {
        let pending = spawn_submission(Arc::new(StubAnalyst::Panic), report());
        assert_eq!(pending.resolve().await, SubmissionState::fallback());
    }

    #[test]
    fn state_serializes_with_tag() {
        let json = serde_json::to_value(SubmissionState::Pending).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "PENDING" }));

        let json = serde_json::to_value(SubmissionState::Resolved(feedback(4))).unwrap();
        assert_eq!(json["state"], "RESOLVED");
        assert_eq!(json["feedback"]["priority"], 4);
    }
}
