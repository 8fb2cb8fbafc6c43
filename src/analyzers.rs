//! Optional NLP capability seams.
//!
//! The scorer and the security filter consume these traits, never a
//! concrete model. The default implementations are rule-based; ML-backed
//! implementations are selected at startup. A missing ML model is a
//! configuration state, not a runtime error path — callers that do hit
//! an `AnalyzerError` (load failure, timeout) degrade to the rule path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

// ── Signals ─────────────────────────────────────────────────────────

/// Coarse sentiment label for a ticket text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Neg,
    Neu,
    Pos,
}

/// Semantic urgency of a ticket text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Signals produced by a sentiment analysis pass.
#[derive(Debug, Clone, Copy)]
pub struct SentimentSignals {
    pub label: SentimentLabel,
    /// Hate-speech confidence in [0,1]; rule-based analyzers report 0.
    pub hate_score: f32,
    pub urgency: UrgencyLevel,
}

// ── Capability traits ───────────────────────────────────────────────

/// Sentiment/urgency analysis over deidentified text.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    /// Analyzer name for logging.
    fn name(&self) -> &str;

    /// Analyze deidentified text. Must never receive raw or hash-tagged text.
    async fn analyze(&self, text: &str) -> Result<SentimentSignals, AnalyzerError>;
}

/// Binary phishing classifier over credential-masked text.
#[async_trait]
pub trait PhishingClassifier: Send + Sync {
    /// Classifier name for logging.
    fn name(&self) -> &str;

    /// Probability in [0,1] that the text is a phishing attempt.
    async fn phishing_probability(&self, text: &str) -> Result<f32, AnalyzerError>;
}

// ── Rule-based default ──────────────────────────────────────────────

const NEGATIVE_MARKERS: &[&str] = &[
    "malo",
    "pésimo",
    "error",
    "falla",
    "no funciona",
    "molesto",
];

const URGENCY_CRITICAL: &[&str] = &["caído", "no funciona", "no puedo acceder", "error crítico"];

const URGENCY_HIGH: &[&str] = &["urgente", "inmediato", "lo necesito ya", "por favor urgente"];

const URGENCY_MEDIUM: &[&str] = &["mejora", "feature", "solicitud"];

/// Keyword-rule sentiment analyzer — the default when no NLP model is
/// configured. Hate score is always 0.
pub struct LexiconSentiment;

#[async_trait]
impl SentimentAnalyzer for LexiconSentiment {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn analyze(&self, text: &str) -> Result<SentimentSignals, AnalyzerError> {
        let t = text.to_lowercase();

        let label = if NEGATIVE_MARKERS.iter().any(|w| t.contains(w)) {
            SentimentLabel::Neg
        } else {
            SentimentLabel::Neu
        };

        let urgency = if URGENCY_CRITICAL.iter().any(|w| t.contains(w)) {
            UrgencyLevel::Critical
        } else if URGENCY_HIGH.iter().any(|w| t.contains(w)) {
            UrgencyLevel::High
        } else if URGENCY_MEDIUM.iter().any(|w| t.contains(w)) {
            UrgencyLevel::Medium
        } else {
            UrgencyLevel::Low
        };

        Ok(SentimentSignals {
            label,
            hate_score: 0.0,
            urgency,
        })
    }
}
