//! Shared types for the ticket intake pipeline.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Inbound request ─────────────────────────────────────────────────

/// Raw ticket submission from any channel.
///
/// Channel adapters (HTTP handler, email poller) build this struct; the
/// pipeline processes it through security → redaction → scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Free-text body. Required; validated by the processor.
    #[serde(default)]
    pub text: String,
    /// Caller-supplied client identifier, unauthenticated.
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    /// Optional caller-supplied date string, kept verbatim.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: Option<TicketSource>,
}

/// Submission channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketSource {
    Web,
    Email,
}

impl Default for TicketSource {
    fn default() -> Self {
        Self::Web
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Ticket classification: defect vs. feature/improvement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Defect report — materially raises flight risk.
    Correctivo,
    /// Feature/improvement request — investment signals commitment.
    Evolutivo,
}

impl Classification {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Correctivo => "Correctivo",
            Self::Evolutivo => "Evolutivo",
        }
    }
}

// ── Churn tier ──────────────────────────────────────────────────────

/// Discrete churn risk tier, derived solely from the churn score.
///
/// The dashboard color-codes directly off this tier; breakpoints are
/// fixed and must not drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnLevel {
    Bajo,
    Medio,
    Alto,
    #[serde(rename = "Muy Alto")]
    MuyAlto,
    #[serde(rename = "Crítico")]
    Critico,
}

impl ChurnLevel {
    /// Tier for a clamped score in [0,100].
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=30 => Self::Bajo,
            31..=60 => Self::Medio,
            61..=80 => Self::Alto,
            81..=94 => Self::MuyAlto,
            _ => Self::Critico,
        }
    }

    /// Fixed UI color for this tier.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Bajo => "green",
            Self::Medio => "yellow",
            Self::Alto => "orange",
            Self::MuyAlto => "red",
            Self::Critico => "darkred",
        }
    }
}

// ── Ticket record ───────────────────────────────────────────────────

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Processed,
    #[serde(rename = "resolved")]
    Resolved,
}

/// The decision-ready ticket record produced by the pipeline.
///
/// Created exactly once per accepted request; mutated only by the
/// resolution operation. Quarantined submissions never produce one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Monotonically increasing id, assigned by the store at acceptance.
    pub id: u64,
    pub client_id: String,
    pub client_email: String,
    pub client_name: String,
    /// Raw input, kept on the in-memory record for agent display.
    pub text_original: String,
    /// Placeholder/hash-redacted text for audit.
    pub redacted_text: String,
    /// PII-stripped text — the only form any model may consume.
    pub deidentified_text: String,
    pub classification: Classification,
    /// Clamped to [0,100].
    pub churn_score: u8,
    pub churn_level: ChurnLevel,
    /// Tier color, denormalized for the dashboard.
    pub churn_color: String,
    pub insight: String,
    pub status: TicketStatus,
    pub source: TicketSource,
    /// Phishing probability in [0,1], retained for audit on acceptance.
    pub phishing_score: f32,
    /// Denormalized from the resolved client profile.
    pub project: String,
    pub sector: String,
    pub tenure_years: f32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Result of a successful pipeline run.
///
/// The PII map is ephemeral and owned by this single request; it must
/// only ever travel through secured side-channels, never to untrusted
/// clients.
#[derive(Debug, Clone)]
pub struct ProcessedTicket {
    pub ticket: Ticket,
    /// hash → original value for re-identification by authorized staff.
    pub pii_map: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_level_breakpoints() {
        assert_eq!(ChurnLevel::from_score(0), ChurnLevel::Bajo);
        assert_eq!(ChurnLevel::from_score(30), ChurnLevel::Bajo);
        assert_eq!(ChurnLevel::from_score(31), ChurnLevel::Medio);
        assert_eq!(ChurnLevel::from_score(60), ChurnLevel::Medio);
        assert_eq!(ChurnLevel::from_score(61), ChurnLevel::Alto);
        assert_eq!(ChurnLevel::from_score(80), ChurnLevel::Alto);
        assert_eq!(ChurnLevel::from_score(81), ChurnLevel::MuyAlto);
        assert_eq!(ChurnLevel::from_score(94), ChurnLevel::MuyAlto);
        assert_eq!(ChurnLevel::from_score(95), ChurnLevel::Critico);
        assert_eq!(ChurnLevel::from_score(100), ChurnLevel::Critico);
    }

    #[test]
    fn churn_level_colors() {
        assert_eq!(ChurnLevel::Bajo.color(), "green");
        assert_eq!(ChurnLevel::Critico.color(), "darkred");
    }

    #[test]
    fn ticket_request_defaults() {
        let req: TicketRequest = serde_json::from_str(r#"{"text": "hola"}"#).unwrap();
        assert_eq!(req.text, "hola");
        assert!(req.client_id.is_empty());
        assert!(req.source.is_none());
    }

    #[test]
    fn churn_level_serializes_spanish_labels() {
        assert_eq!(
            serde_json::to_value(ChurnLevel::MuyAlto).unwrap(),
            serde_json::json!("Muy Alto")
        );
        assert_eq!(
            serde_json::to_value(ChurnLevel::Critico).unwrap(),
            serde_json::json!("Crítico")
        );
    }

    #[test]
    fn status_resolved_uses_lowercase_wire_label() {
        assert_eq!(
            serde_json::to_value(TicketStatus::Resolved).unwrap(),
            serde_json::json!("resolved")
        );
    }
}
