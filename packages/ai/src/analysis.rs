//! Report analysis, line ranking and regional risk over an LLM provider.
//!
//! [`TransitAnalyst`] is the seam the rest of the application depends on;
//! [`GenerativeAnalyst`] implements it by prompting a [`LlmProvider`] for a
//! JSON document and validating the result.

use std::sync::Arc;

use serde::Deserialize;
use vigia_report_models::insights::{LineRanking, REGIONS, RegionalRisk};
use vigia_report_models::{AnalysisFeedback, ReportData};

use crate::providers::{LlmProvider, create_provider_from_env};
use crate::{AiError, json};

const SYSTEM_PROMPT: &str = "Você é um assistente de segurança para um app de transporte público \
     (Vigia Cidadã). Responda sempre em português do Brasil.";

/// Analysis and statistics operations consumed by the application.
#[async_trait::async_trait]
pub trait TransitAnalyst: Send + Sync {
    /// Produces a summary, priority (1-5) and advice for a report.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] on transport failure or unusable content.
    async fn analyze_report(&self, report: &ReportData) -> Result<AnalysisFeedback, AiError>;

    /// Lines with the most complaints in the last 24 hours for a region.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] on transport failure or unusable content.
    async fn line_ranking(&self, uf: &str, city: &str) -> Result<LineRanking, AiError>;

    /// Complaint volume and risk tier per administrative region.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] on transport failure or unusable content.
    async fn regional_risk(&self) -> Result<RegionalRisk, AiError>;
}

/// [`TransitAnalyst`] backed by a generative model.
pub struct GenerativeAnalyst {
    provider: Box<dyn LlmProvider>,
}

impl GenerativeAnalyst {
    /// Wraps a provider.
    #[must_use]
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

/// Raw feedback as produced by the model, before range validation.
#[derive(Deserialize)]
struct RawFeedback {
    summary: String,
    priority: i64,
    advice: String,
}

impl TryFrom<RawFeedback> for AnalysisFeedback {
    type Error = AiError;

    fn try_from(raw: RawFeedback) -> Result<Self, Self::Error> {
        let priority = u8::try_from(raw.priority)
            .ok()
            .filter(|p| (1..=5).contains(p))
            .ok_or_else(|| AiError::InvalidResponse {
                message: format!("priority {} out of range 1-5", raw.priority),
            })?;

        Ok(Self {
            summary: raw.summary,
            priority,
            advice: raw.advice,
        })
    }
}

/// Builds the analysis prompt for a report.
#[must_use]
pub fn build_report_prompt(report: &ReportData) -> String {
    let sub_category = report.sub_category.map_or("N/A", |s| s.label());
    let discrete = if report.is_discrete { "SIM" } else { "NÃO" };

    format!(
        "Analise a seguinte denúncia e forneça um resumo curto para o painel de controle \
         e um nível de prioridade (1 a 5).\n\n\
         Dados da denúncia:\n\
         Categoria: {category}\n\
         Subcategoria: {sub_category}\n\
         Linha: {line}\n\
         Veículo: {vehicle}\n\
         Descrição: {description}\n\
         Modo Discreto Usado: {discrete}",
        category = report.category.display_name(),
        line = report.line_id,
        vehicle = report.vehicle_id,
        description = report.description,
    )
}

/// Builds the ranking prompt for a region.
#[must_use]
pub fn build_ranking_prompt(uf: &str, city: &str) -> String {
    format!(
        "Gere um JSON contendo uma lista fictícia, mas realista baseada em dados comuns de \
         transporte público, das 5 linhas de ônibus (ou metrô/trem) de {city} - {uf} com o \
         maior número de reclamações nas últimas 24 horas.\n\n\
         Importante: Use nomes de linhas ou números reais se souber, ou invente formatos \
         plausíveis para a cidade especificada.\n\n\
         Para cada item, inclua:\n\
         - lineId: identificação da linha (ex: número ou nome)\n\
         - totalReports: número de reclamações (entre 10 e 100)\n\
         - mainIssue: principal motivo (ex: Atraso, Superlotação, Segurança, Ar condicionado)\n\
         - trend: \"UP\" (subindo), \"DOWN\" (descendo) ou \"STABLE\" (estável)"
    )
}

/// Builds the regional risk prompt covering every region in [`REGIONS`].
#[must_use]
pub fn build_regions_prompt() -> String {
    let names = REGIONS
        .iter()
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Gere um JSON com estatísticas de denúncias para as {count} regionais de Belo \
         Horizonte ({names}).\n\
         Para cada regional, forneça:\n\
         - id: nome da regional em lowercase sem acento (ex: 'barreiro', 'centro-sul')\n\
         - name: Nome formatado (ex: Barreiro)\n\
         - complaints: número de denúncias nas últimas 24h (0 a 100)\n\
         - riskLevel: \"LOW\" (Verde), \"MEDIUM\" (Amarelo), \"HIGH\" (Vermelho)",
        count = REGIONS.len(),
    )
}

fn feedback_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string", "description": "Resumo de uma frase para o operador" },
            "priority": { "type": "integer", "description": "1 (Baixa) a 5 (Crítica/Emergência)" },
            "advice": { "type": "string", "description": "Conselho imediato para o usuário (curto)" }
        },
        "required": ["summary", "priority", "advice"]
    })
}

fn ranking_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "ranking": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "lineId": { "type": "string" },
                        "totalReports": { "type": "integer" },
                        "mainIssue": { "type": "string" },
                        "trend": { "type": "string", "enum": ["UP", "DOWN", "STABLE"] }
                    },
                    "required": ["lineId", "totalReports", "mainIssue", "trend"]
                }
            }
        },
        "required": ["ranking"]
    })
}

fn regions_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "regions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "complaints": { "type": "integer" },
                        "riskLevel": { "type": "string", "enum": ["LOW", "MEDIUM", "HIGH"] }
                    },
                    "required": ["id", "name", "complaints", "riskLevel"]
                }
            }
        },
        "required": ["regions"]
    })
}

/// Parses and validates a feedback document.
///
/// # Errors
///
/// Returns [`AiError`] if the text holds no feedback JSON or the priority
/// is outside 1-5.
pub fn parse_feedback(text: &str) -> Result<AnalysisFeedback, AiError> {
    json::parse_json::<RawFeedback>(text)?.try_into()
}

#[async_trait::async_trait]
impl TransitAnalyst for GenerativeAnalyst {
    async fn analyze_report(&self, report: &ReportData) -> Result<AnalysisFeedback, AiError> {
        let prompt = build_report_prompt(report);
        let text = self
            .provider
            .complete_json(SYSTEM_PROMPT, &prompt, &feedback_schema())
            .await?;
        parse_feedback(&text)
    }

    async fn line_ranking(&self, uf: &str, city: &str) -> Result<LineRanking, AiError> {
        let prompt = build_ranking_prompt(uf, city);
        let text = self
            .provider
            .complete_json(SYSTEM_PROMPT, &prompt, &ranking_schema())
            .await?;
        json::parse_json(&text)
    }

    async fn regional_risk(&self) -> Result<RegionalRisk, AiError> {
        let text = self
            .provider
            .complete_json(SYSTEM_PROMPT, &build_regions_prompt(), &regions_schema())
            .await?;
        json::parse_json(&text)
    }
}

/// Stand-in used when no provider is configured. Every call fails, so
/// callers take their fallback path.
pub struct OfflineAnalyst {
    reason: String,
}

impl OfflineAnalyst {
    /// Creates an offline analyst that reports `reason` on every call.
    #[must_use]
    pub const fn new(reason: String) -> Self {
        Self { reason }
    }

    fn unavailable(&self) -> AiError {
        AiError::Config {
            message: self.reason.clone(),
        }
    }
}

#[async_trait::async_trait]
impl TransitAnalyst for OfflineAnalyst {
    async fn analyze_report(&self, _report: &ReportData) -> Result<AnalysisFeedback, AiError> {
        Err(self.unavailable())
    }

    async fn line_ranking(&self, _uf: &str, _city: &str) -> Result<LineRanking, AiError> {
        Err(self.unavailable())
    }

    async fn regional_risk(&self) -> Result<RegionalRisk, AiError> {
        Err(self.unavailable())
    }
}

/// Builds the analyst from the provider environment variables. A missing
/// or invalid configuration yields an [`OfflineAnalyst`].
#[must_use]
pub fn analyst_from_env() -> Arc<dyn TransitAnalyst> {
    match create_provider_from_env() {
        Ok(provider) => Arc::new(GenerativeAnalyst::new(provider)),
        Err(e) => {
            log::warn!("AI analysis unavailable, reports will get fallback feedback: {e}");
            Arc::new(OfflineAnalyst::new(e.to_string()))
        }
    }
}

/// Fetches the line ranking, degrading to an empty ranking on any failure.
pub async fn line_ranking_or_empty(analyst: &dyn TransitAnalyst, uf: &str, city: &str) -> LineRanking {
    match analyst.line_ranking(uf, city).await {
        Ok(ranking) => ranking,
        Err(e) => {
            log::error!("Error fetching ranking for {city} - {uf}: {e}");
            LineRanking::default()
        }
    }
}

/// Fetches regional risk, degrading to an empty overview on any failure.
pub async fn regional_risk_or_empty(analyst: &dyn TransitAnalyst) -> RegionalRisk {
    match analyst.regional_risk().await {
        Ok(risk) => risk,
        Err(e) => {
            log::error!("Error fetching regions: {e}");
            RegionalRisk::default()
        }
    }
}
