//! Discrete mode: a decoy news article whose comment box files a report.
//!
//! Whatever was typed as a "comment" becomes the report description,
//! always tagged SECURITY / HARASSMENT. Publishing waits an artificial
//! delay first so the screen behaves like a real comment post.

use std::time::Duration;

use serde::Serialize;
use vigia_report_models::{ReportCategory, ReportData, SecurityType};

use crate::FlowError;
use crate::form::DiscreteHandoff;

/// Delay before a published comment is turned into a report.
pub const DEFAULT_PUBLISH_DELAY: Duration = Duration::from_millis(1500);

/// Label of the exit control that is always on screen.
pub const EXIT_LABEL: &str = "Sair do modo discreto";

/// Placeholder of the comment box.
pub const COMMENT_PLACEHOLDER: &str = "Escreva sua opinião...";

/// Static content of the decoy screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoyArticle {
    /// Masthead.
    pub outlet: &'static str,
    /// Article headline.
    pub headline: &'static str,
    /// Byline under the headline.
    pub byline: &'static str,
    /// Article body.
    pub body: &'static str,
    /// Comment counter.
    pub comments: &'static str,
    /// Share counter.
    pub shares: &'static str,
    /// Heading above the comment box.
    pub comment_heading: &'static str,
    /// Disclaimer under the comment box.
    pub disclaimer: &'static str,
}

/// The article shown in discrete mode.
pub const DECOY_ARTICLE: DecoyArticle = DecoyArticle {
    outlet: "BH Notícias",
    headline: "Trânsito intenso na região central de BH nesta manhã",
    byline: "Atualizado há 10 minutos • Por Redação",
    body: "Motoristas enfrentam lentidão na Avenida Afonso Pena devido a obras de manutenção. \
           A BHTrans recomenda rotas alternativas para quem segue em direção à Savassi. \
           O transporte público opera com atrasos pontuais.",
    comments: "24 Comentários",
    shares: "108 Compartilhamentos",
    comment_heading: "Deixe seu comentário",
    disclaimer: "Comentários são de responsabilidade exclusiva dos autores.",
};

/// State of the discrete comment box.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteFlow {
    handoff: DiscreteHandoff,
    comment: String,
    publishing: bool,
}

impl DiscreteFlow {
    /// Enters discrete mode with the partial draft from the wizard.
    #[must_use]
    pub const fn new(handoff: DiscreteHandoff) -> Self {
        Self {
            handoff,
            comment: String::new(),
            publishing: false,
        }
    }

    /// The decoy content to render.
    #[must_use]
    pub const fn article(&self) -> &'static DecoyArticle {
        &DECOY_ARTICLE
    }

    /// Data forwarded from the wizard.
    #[must_use]
    pub const fn handoff(&self) -> &DiscreteHandoff {
        &self.handoff
    }

    /// Current comment text.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Replaces the comment text.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Whether a publish is in progress.
    #[must_use]
    pub const fn is_publishing(&self) -> bool {
        self.publishing
    }

    /// Label of the publish button.
    #[must_use]
    pub const fn publish_label(&self) -> &'static str {
        if self.publishing {
            "Publicando..."
        } else {
            "Publicar"
        }
    }

    /// Whether the publish button is enabled.
    #[must_use]
    pub fn can_publish(&self) -> bool {
        !self.publishing && !self.comment.trim().is_empty()
    }

    /// Builds the report behind the comment. The comment text becomes the
    /// description unmodified.
    ///
    /// The category is always SECURITY / HARASSMENT, whichever option
    /// opened discrete mode.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::EmptyComment`] if the comment is blank.
    pub fn compose(&self, now: i64) -> Result<ReportData, FlowError> {
        if self.comment.trim().is_empty() {
            return Err(FlowError::EmptyComment);
        }

        Ok(ReportData {
            line_id: self.handoff.line_id.clone(),
            vehicle_id: self.handoff.vehicle_id.clone(),
            category: ReportCategory::Security,
            sub_category: Some(SecurityType::Harassment),
            description: self.comment.clone(),
            location: self.handoff.location,
            media: None,
            timestamp: now,
            is_discrete: true,
        })
    }

    /// Publishes the comment: composes the report stamped with `now`, then
    /// waits `delay` before handing it back.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::AlreadyPublishing`] on a second press, or
    /// [`FlowError::EmptyComment`] if the comment is blank.
    pub async fn publish(&mut self, now: i64, delay: Duration) -> Result<ReportData, FlowError> {
        if self.publishing {
            return Err(FlowError::AlreadyPublishing);
        }
        let report = self.compose(now)?;

        self.publishing = true;
        tokio::time::sleep(delay).await;

        Ok(report)
    }
}
