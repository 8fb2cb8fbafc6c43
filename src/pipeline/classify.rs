//! Ticket classification — corrective (defect) vs. evolutionary (feature).
//!
//! Ambiguous text defaults to Evolutivo, the less-alarming label, so
//! neutral requests never trigger the corrective churn penalty.

use crate::pipeline::types::Classification;

/// Defect-indicating keywords, matched as case-insensitive substrings.
const CORRECTIVE_KEYWORDS: &[&str] = &[
    "error",
    "fallo",
    "falla",
    "bug",
    "caída",
    "caído",
    "no funciona",
];

/// Classify a ticket text. No third category exists.
pub fn classify(text: &str) -> Classification {
    let t = text.to_lowercase();
    if CORRECTIVE_KEYWORDS.iter().any(|k| t.contains(k)) {
        Classification::Correctivo
    } else {
        Classification::Evolutivo
    }
}
