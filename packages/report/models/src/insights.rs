//! Aggregate statistics returned by the generative ranking and
//! regional-risk boundaries.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default state used when a ranking is requested without a region.
pub const DEFAULT_UF: &str = "MG";
/// Default city used when a ranking is requested without a region.
pub const DEFAULT_CITY: &str = "Belo Horizonte";

/// Direction of the complaint volume for a line.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    /// Complaints increasing
    Up,
    /// Complaints decreasing
    Down,
    /// Roughly flat
    Stable,
}

/// One line in the complaint ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRankingEntry {
    /// Line number or name.
    pub line_id: String,
    /// Complaints in the last 24 hours.
    pub total_reports: u32,
    /// Most common complaint.
    pub main_issue: String,
    /// Recent direction.
    pub trend: Trend,
}

/// Lines with the most complaints in a region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRanking {
    /// Ordered most complaints first.
    #[serde(default)]
    pub ranking: Vec<LineRankingEntry>,
}

/// Coarse severity tier for a region.
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
pub enum RiskLevel {
    /// Green
    Low,
    /// Yellow
    Medium,
    /// Red
    High,
}

/// Complaint volume and risk tier of one administrative region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRisk {
    /// Lower-case, accent-free slug (e.g. `centro-sul`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Complaints in the last 24 hours.
    pub complaints: u32,
    /// Severity tier.
    pub risk_level: RiskLevel,
}

/// Risk overview for every region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionalRisk {
    /// One entry per region; may be empty when the lookup failed.
    #[serde(default)]
    pub regions: Vec<RegionRisk>,
}

impl RegionalRisk {
    /// Finds a region by its slug.
    #[must_use]
    pub fn region(&self, id: &str) -> Option<&RegionRisk> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Sum of complaints across all regions.
    #[must_use]
    pub fn total_complaints(&self) -> u64 {
        self.regions.iter().map(|r| u64::from(r.complaints)).sum()
    }
}

/// The nine administrative regions of Belo Horizonte as `(id, name)`.
pub const REGIONS: [(&str, &str); 9] = [
    ("barreiro", "Barreiro"),
    ("centro-sul", "Centro-Sul"),
    ("leste", "Leste"),
    ("nordeste", "Nordeste"),
    ("noroeste", "Noroeste"),
    ("norte", "Norte"),
    ("oeste", "Oeste"),
    ("pampulha", "Pampulha"),
    ("venda-nova", "Venda Nova"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_parses_wire_format() {
        let json = r#"{"ranking":[{"lineId":"4033","totalReports":42,"mainIssue":"Atraso","trend":"UP"}]}"#;
        let ranking: LineRanking = serde_json::from_str(json).unwrap();
        assert_eq!(ranking.ranking[0].line_id, "4033");
        assert_eq!(ranking.ranking[0].trend, Trend::Up);
    }

    #[test]
    fn missing_list_defaults_to_empty() {
        let risk: RegionalRisk = serde_json::from_str("{}").unwrap();
        assert!(risk.regions.is_empty());
        assert_eq!(risk.total_complaints(), 0);
    }

    #[test]
    fn region_lookup_by_slug() {
        let risk = RegionalRisk {
            regions: vec![RegionRisk {
                id: "pampulha".to_string(),
                name: "Pampulha".to_string(),
                complaints: 12,
                risk_level: RiskLevel::Medium,
            }],
        };
        assert_eq!(risk.region("pampulha").unwrap().complaints, 12);
        assert!(risk.region("leste").is_none());
    }
}
