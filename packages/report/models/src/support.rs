//! Locally persisted records: support tickets, bug reports, favorite
//! lines and user preferences.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Lifecycle of a support ticket.
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
pub enum TicketStatus {
    /// Waiting for an answer
    Pending,
    /// Answered by the support team
    Answered,
    /// Closed
    Closed,
}

/// Which support channel a ticket belongs to.
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
pub enum TicketKind {
    /// "Fale conosco" messages
    Contact,
    /// App bug reports
    Bug,
}

impl TicketKind {
    /// Prefix of the protocol number handed back to the user.
    #[must_use]
    pub const fn protocol_prefix(self) -> &'static str {
        match self {
            Self::Contact => "AT",
            Self::Bug => "BUG",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Contact, Self::Bug]
    }
}

/// A support message or bug report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    /// Unique ID.
    pub id: String,
    /// Protocol number shown to the user (e.g. `AT-20261234`).
    pub protocol: String,
    /// Subject, or the app area for bug reports.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Current status.
    pub status: TicketStatus,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    /// Support team answer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Safety status of a favorite line.
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
pub enum LineStatus {
    /// No active alerts
    Safe,
    /// Some recent alerts
    Warning,
    /// Many recent alerts
    Critical,
}

/// A transit line pinned on the "Minha Rota" screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLine {
    /// Unique ID.
    pub id: String,
    /// Line number (e.g. `4033`).
    pub number: String,
    /// Route name.
    pub name: String,
    /// Current status.
    pub status: LineStatus,
    /// Estimated arrival, human readable.
    pub eta: String,
    /// Alerts currently open on this line.
    pub active_alerts: u32,
}

/// Font size preference.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum FontSize {
    /// Small
    Small,
    /// Medium
    #[default]
    Medium,
    /// Large
    Large,
}

/// Settings and privacy toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Preferences {
    /// Push notifications enabled.
    pub push_enabled: bool,
    /// Line used for route alerts.
    pub favorite_line: String,
    /// Text size.
    pub font_size: FontSize,
    /// High-contrast theme.
    pub high_contrast: bool,
    /// Reduce network usage.
    pub data_saver: bool,
    /// Reports are sent without identity.
    pub anonymous_reports: bool,
    /// Biometric unlock.
    pub biometric_enabled: bool,
    /// Disguise the app icon and name.
    pub camouflage_mode: bool,
    /// Location may be captured.
    pub gps_allowed: bool,
    /// Camera may be used for evidence.
    pub camera_allowed: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            push_enabled: true,
            favorite_line: "4033".to_string(),
            font_size: FontSize::Medium,
            high_contrast: false,
            data_saver: false,
            anonymous_reports: false,
            biometric_enabled: false,
            camouflage_mode: false,
            gps_allowed: true,
            camera_allowed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_preferences_fill_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"dataSaver":true}"#).unwrap();
        assert!(prefs.data_saver);
        assert!(prefs.push_enabled);
        assert_eq!(prefs.favorite_line, "4033");
    }

    #[test]
    fn ticket_omits_missing_response() {
        let ticket = SupportTicket {
            id: "1".to_string(),
            protocol: "AT-20260001".to_string(),
            subject: "s".to_string(),
            message: "m".to_string(),
            status: TicketStatus::Pending,
            timestamp: 0,
            response: None,
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert!(json.get("response").is_none());
        assert_eq!(json["status"], "PENDING");
    }
}
