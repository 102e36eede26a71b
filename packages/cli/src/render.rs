//! Plain-text rendering of screen content.

use chrono::DateTime;
use console::style;
use vigia_flow::submission::SubmissionState;
use vigia_report_models::insights::{LineRanking, RegionalRisk, RiskLevel, Trend};
use vigia_report_models::support::{FavoriteLine, LineStatus, SupportTicket, TicketStatus};
use vigia_report_models::{AnalysisFeedback, MAX_PRIORITY};

const NO_DATA: &str = "Nenhum dado disponível no momento.";

/// Five-segment priority gauge, e.g. `■■■□□ 3/5`.
#[must_use]
pub fn priority_gauge(priority: u8) -> String {
    let filled = priority.min(MAX_PRIORITY);
    let gauge: String = (1..=MAX_PRIORITY)
        .map(|level| if level <= filled { '■' } else { '□' })
        .collect();
    format!("{gauge} {priority}/{MAX_PRIORITY}")
}

/// The feedback card shown once the analysis settled.
#[must_use]
pub fn feedback_card(feedback: &AnalysisFeedback) -> String {
    let gauge = priority_gauge(feedback.priority);
    let gauge = if feedback.is_urgent() {
        style(gauge).red().bold().to_string()
    } else {
        style(gauge).yellow().to_string()
    };

    format!(
        "Status\n  {}\nPrioridade Identificada\n  {gauge}\nRecomendação\n  {}",
        feedback.summary, feedback.advice
    )
}

/// Full result screen for a settled submission.
#[must_use]
pub fn submission_result(state: &SubmissionState) -> String {
    let Some(feedback) = state.feedback() else {
        return "Processando denúncia...".to_string();
    };

    let heading = if feedback.is_urgent() {
        style("Denúncia Recebida").red().bold()
    } else {
        style("Denúncia Recebida").green().bold()
    };

    format!(
        "{heading}\n\n{}\n\nSua identidade foi preservada. \
         Os dados de geolocalização foram anexados à denúncia.",
        feedback_card(feedback)
    )
}

const fn trend_arrow(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "↑",
        Trend::Down => "↓",
        Trend::Stable => "→",
    }
}

/// Numbered complaint ranking.
#[must_use]
pub fn ranking_table(ranking: &LineRanking) -> String {
    if ranking.ranking.is_empty() {
        return NO_DATA.to_string();
    }

    ranking
        .ranking
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{:>2}. Linha {:<8} {:>4} denúncias  {}  {}",
                i + 1,
                entry.line_id,
                entry.total_reports,
                trend_arrow(entry.trend),
                entry.main_issue
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const fn risk_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "Baixo",
        RiskLevel::Medium => "Médio",
        RiskLevel::High => "Alto",
    }
}

/// Per-region complaint counts with their risk tier.
#[must_use]
pub fn regions_table(risk: &RegionalRisk) -> String {
    if risk.regions.is_empty() {
        return NO_DATA.to_string();
    }

    let mut lines: Vec<String> = risk
        .regions
        .iter()
        .map(|region| {
            let level = match region.risk_level {
                RiskLevel::Low => style(risk_label(region.risk_level)).green(),
                RiskLevel::Medium => style(risk_label(region.risk_level)).yellow(),
                RiskLevel::High => style(risk_label(region.risk_level)).red(),
            };
            format!(
                "{:<12} {:>4} denúncias  risco {level}",
                region.name, region.complaints
            )
        })
        .collect();

    lines.push(format!("Total: {} denúncias", risk.total_complaints()));
    lines.join("\n")
}

const fn line_status_label(status: LineStatus) -> &'static str {
    match status {
        LineStatus::Safe => "Normal",
        LineStatus::Warning => "Atenção",
        LineStatus::Critical => "Crítico",
    }
}

/// One favorite line.
#[must_use]
pub fn favorite_row(line: &FavoriteLine) -> String {
    let eta = if line.eta.is_empty() {
        String::new()
    } else {
        format!("  chega em {}", line.eta)
    };
    let alerts = match line.active_alerts {
        0 => String::new(),
        1 => "  1 alerta".to_string(),
        n => format!("  {n} alertas"),
    };

    format!(
        "{:<6} {}  [{}]{eta}{alerts}",
        line.number,
        line.name,
        line_status_label(line.status)
    )
}

const fn ticket_status_label(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Pending => "Em análise",
        TicketStatus::Answered => "Respondido",
        TicketStatus::Closed => "Encerrado",
    }
}

/// Formats epoch millis as `dd/mm/yyyy hh:mm` (UTC).
#[must_use]
pub fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map_or_else(String::new, |dt| dt.format("%d/%m/%Y %H:%M").to_string())
}

/// A support ticket with its response, if any.
#[must_use]
pub fn ticket_card(ticket: &SupportTicket) -> String {
    let mut card = format!(
        "{}  {}  [{}]\n  {}\n  {}",
        ticket.protocol,
        format_timestamp(ticket.timestamp),
        ticket_status_label(ticket.status),
        ticket.subject,
        ticket.message
    );
    if let Some(response) = &ticket.response {
        card.push_str(&format!("\n  Resposta: {response}"));
    }
    card
}

#[cfg(test)]
mod tests {
    use vigia_report_models::insights::{LineRankingEntry, RegionRisk};

    use super::*;

    #[test]
    fn gauge_fills_up_to_priority() {
        assert_eq!(priority_gauge(3), "■■■□□ 3/5");
        assert_eq!(priority_gauge(5), "■■■■■ 5/5");
    }

    #[test]
    fn pending_state_has_no_card() {
        assert_eq!(
            submission_result(&SubmissionState::Pending),
            "Processando denúncia..."
        );
    }

    #[test]
    fn fallback_result_shows_fallback_text() {
        let text = submission_result(&SubmissionState::fallback());
        assert!(text.contains("Denúncia recebida. Análise pendente."));
        assert!(text.contains("Obrigado por reportar. Mantenha-se seguro."));
        assert!(text.contains("3/5"));
    }

    #[test]
    fn empty_insights_show_placeholder() {
        assert_eq!(ranking_table(&LineRanking::default()), NO_DATA);
        assert_eq!(regions_table(&RegionalRisk::default()), NO_DATA);
    }

    #[test]
    fn ranking_is_numbered() {
        let ranking = LineRanking {
            ranking: vec![
                LineRankingEntry {
                    line_id: "4033".to_string(),
                    total_reports: 41,
                    main_issue: "Superlotação".to_string(),
                    trend: Trend::Up,
                },
                LineRankingEntry {
                    line_id: "8207".to_string(),
                    total_reports: 17,
                    main_issue: "Atrasos".to_string(),
                    trend: Trend::Down,
                },
            ],
        };
        let table = ranking_table(&ranking);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1. Linha 4033"));
        assert!(lines[1].contains('↓'));
    }

    #[test]
    fn regions_end_with_total() {
        let risk = RegionalRisk {
            regions: vec![
                RegionRisk {
                    id: "centro-sul".to_string(),
                    name: "Centro-Sul".to_string(),
                    complaints: 30,
                    risk_level: RiskLevel::High,
                },
                RegionRisk {
                    id: "barreiro".to_string(),
                    name: "Barreiro".to_string(),
                    complaints: 12,
                    risk_level: RiskLevel::Low,
                },
            ],
        };
        let table = regions_table(&risk);
        assert!(table.ends_with("Total: 42 denúncias"));
        assert!(table.contains("Alto"));
    }

    #[test]
    fn favorite_without_eta_or_alerts() {
        let line = FavoriteLine {
            id: "x".to_string(),
            number: "5102".to_string(),
            name: "Barreiro / Centro".to_string(),
            status: LineStatus::Safe,
            eta: String::new(),
            active_alerts: 0,
        };
        assert_eq!(favorite_row(&line), "5102   Barreiro / Centro  [Normal]");
    }

    #[test]
    fn ticket_includes_response() {
        let ticket = SupportTicket {
            id: "demo".to_string(),
            protocol: "SUP-20248821".to_string(),
            subject: "Dúvida".to_string(),
            message: "Como funciona?".to_string(),
            status: TicketStatus::Answered,
            timestamp: 0,
            response: Some("Obrigado pelo contato".to_string()),
        };
        let card = ticket_card(&ticket);
        assert!(card.starts_with("SUP-20248821  01/01/1970 00:00  [Respondido]"));
        assert!(card.ends_with("Resposta: Obrigado pelo contato"));
    }
}
