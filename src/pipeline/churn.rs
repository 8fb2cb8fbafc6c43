//! Churn scoring — one formula, named and versioned weight sets.
//!
//! The historical variants (pure keyword heuristic vs. NLP-signal
//! scoring) are consolidated into a single additive model:
//!
//! `score = clamp(base + sentiment + classification + tenure + urgency, 0, 100)`
//!
//! The sentiment term is lexical (weighted keyword counts) unless the
//! weight set is semantic AND analyzer signals are available; a missing
//! or failed analyzer degrades to the lexical term, never to an error.

use serde::Serialize;

use crate::analyzers::{SentimentLabel, SentimentSignals, UrgencyLevel};
use crate::pipeline::types::{Classification, ChurnLevel};

/// Negative sentiment markers; each hit raises risk sharply.
const NEGATIVE_WORDS: &[&str] = &[
    "lento",
    "malo",
    "pésimo",
    "error",
    "falla",
    "urgente",
    "molesto",
    "cancelar",
    "baja",
    "insatisfecho",
];

/// Positive markers; each hit gives back a small credit.
const POSITIVE_WORDS: &[&str] = &[
    "gracias",
    "excelente",
    "bueno",
    "rápido",
    "mejorar",
    "cotización",
    "interesado",
];

/// A named, versioned weight set for the churn formula.
#[derive(Debug, Clone, Serialize)]
pub struct ChurnWeights {
    pub name: &'static str,
    /// Fixed base offset.
    pub base: i32,
    /// Per negative keyword hit (lexical sentiment).
    pub negative_hit: i32,
    /// Credit per positive keyword hit (lexical sentiment).
    pub positive_hit: i32,
    /// Sentiment label impacts (semantic sentiment).
    pub sentiment_negative: i32,
    pub sentiment_neutral: i32,
    /// Scale applied to the hate-speech confidence (semantic only).
    pub hate_scale: f32,
    /// Classification impacts.
    pub corrective: i32,
    pub evolutionary: i32,
    /// Urgency impacts (semantic only).
    pub urgency_critical: i32,
    pub urgency_high: i32,
    /// When true, analyzer signals replace the lexical sentiment term.
    pub semantic: bool,
}

impl ChurnWeights {
    /// Pure keyword heuristic — the default profile.
    pub fn heuristic_v1() -> Self {
        Self {
            name: "heuristic_v1",
            base: 30,
            negative_hit: 15,
            positive_hit: 5,
            sentiment_negative: 30,
            sentiment_neutral: 10,
            hate_scale: 40.0,
            corrective: 25,
            evolutionary: -15,
            urgency_critical: 0,
            urgency_high: 0,
            semantic: false,
        }
    }

    /// NLP-signal profile: sentiment label + hate score + urgency.
    pub fn semantic_v1() -> Self {
        Self {
            name: "semantic_v1",
            base: 20,
            urgency_critical: 20,
            urgency_high: 10,
            semantic: true,
            ..Self::heuristic_v1()
        }
    }

    /// Look up a profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "heuristic_v1" => Some(Self::heuristic_v1()),
            "semantic_v1" => Some(Self::semantic_v1()),
            _ => None,
        }
    }
}

/// Result of a churn scoring pass.
#[derive(Debug, Clone, Copy)]
pub struct ChurnScore {
    /// Clamped to [0,100].
    pub score: u8,
    pub level: ChurnLevel,
}

/// Churn scorer over a fixed weight set.
pub struct ChurnScorer {
    weights: ChurnWeights,
}

impl ChurnScorer {
    pub fn new(weights: ChurnWeights) -> Self {
        Self { weights }
    }

    pub fn profile_name(&self) -> &'static str {
        self.weights.name
    }

    /// Score deidentified text plus client context.
    ///
    /// `signals` are optional analyzer output; `None` (model unavailable
    /// or heuristic profile) falls back to the lexical sentiment term.
    pub fn score(
        &self,
        text: &str,
        tenure_years: f32,
        classification: Classification,
        signals: Option<SentimentSignals>,
    ) -> ChurnScore {
        let w = &self.weights;

        let sentiment_impact = match signals {
            Some(s) if w.semantic => {
                let label_impact = match s.label {
                    SentimentLabel::Neg => w.sentiment_negative,
                    SentimentLabel::Neu => w.sentiment_neutral,
                    SentimentLabel::Pos => 0,
                };
                let hate_impact = (s.hate_score.clamp(0.0, 1.0) * w.hate_scale) as i32;
                label_impact + hate_impact
            }
            _ => self.lexical_impact(text),
        };

        let classification_impact = match classification {
            Classification::Correctivo => w.corrective,
            Classification::Evolutivo => w.evolutionary,
        };

        let tenure_impact = tenure_impact(tenure_years);

        let urgency_impact = match signals {
            Some(s) if w.semantic => match s.urgency {
                UrgencyLevel::Critical => w.urgency_critical,
                UrgencyLevel::High => w.urgency_high,
                _ => 0,
            },
            _ => 0,
        };

        let raw = w.base + sentiment_impact + classification_impact + tenure_impact + urgency_impact;
        let score = raw.clamp(0, 100) as u8;

        ChurnScore {
            score,
            level: ChurnLevel::from_score(score),
        }
    }

    fn lexical_impact(&self, text: &str) -> i32 {
        let t = text.to_lowercase();
        let neg = NEGATIVE_WORDS.iter().filter(|wd| t.contains(*wd)).count() as i32;
        let pos = POSITIVE_WORDS.iter().filter(|wd| t.contains(*wd)).count() as i32;
        neg * self.weights.negative_hit - pos * self.weights.positive_hit
    }
}

/// Tenure step function — discrete bands, not a curve. The first band
/// is inclusive at 0.5: a six-month client takes the full new-client
/// penalty.
fn tenure_impact(tenure_years: f32) -> i32 {
    if tenure_years <= 0.5 {
        40
    } else if tenure_years < 1.0 {
        30
    } else if tenure_years < 2.0 {
        10
    } else if tenure_years > 5.0 {
        -20
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristic_scorer() -> ChurnScorer {
        ChurnScorer::new(ChurnWeights::heuristic_v1())
    }

    fn semantic_scorer() -> ChurnScorer {
        ChurnScorer::new(ChurnWeights::semantic_v1())
    }

    #[test]
    fn tenure_bands() {
        assert_eq!(tenure_impact(0.0), 40);
        assert_eq!(tenure_impact(0.5), 40);
        assert_eq!(tenure_impact(0.6), 30);
        assert_eq!(tenure_impact(1.5), 10);
        assert_eq!(tenure_impact(3.0), 0);
        assert_eq!(tenure_impact(5.0), 0);
        assert_eq!(tenure_impact(10.0), -20);
    }

    #[test]
    fn angry_new_client_clamps_to_100() {
        // Reference scenario: four negative hits (pésimo, lento, falla,
        // molesto) at +15 each, Correctivo +25, six-month tenure +40,
        // base 30 — raw 155, clamped.
        let result = heuristic_scorer().score(
            "El servicio es pésimo, muy lento y siempre falla. Estoy molesto.",
            0.5,
            Classification::Correctivo,
            None,
        );
        assert_eq!(result.score, 100);
        assert_eq!(result.level, ChurnLevel::Critico);
    }

    #[test]
    fn loyal_calm_client_is_bajo() {
        // No sentiment hits, Evolutivo -15, tenure -20: raw -5, clamped 0.
        let result = heuristic_scorer().score(
            "Quisiera información del nuevo módulo",
            8.0,
            Classification::Evolutivo,
            None,
        );
        assert_eq!(result.score, 0);
        assert_eq!(result.level, ChurnLevel::Bajo);
    }

    #[test]
    fn positive_words_reduce_score() {
        let neutral = heuristic_scorer().score("todo normal", 3.0, Classification::Evolutivo, None);
        let grateful = heuristic_scorer().score(
            "gracias, excelente servicio",
            3.0,
            Classification::Evolutivo,
            None,
        );
        assert!(grateful.score < neutral.score);
    }

    #[test]
    fn score_always_within_bounds() {
        let scorer = heuristic_scorer();
        let texts = [
            "",
            "pésimo malo lento falla error urgente molesto cancelar baja insatisfecho",
            "gracias excelente bueno rápido",
        ];
        for text in texts {
            for tenure in [0.0, 0.5, 0.9, 1.5, 4.0, 12.0] {
                for class in [Classification::Correctivo, Classification::Evolutivo] {
                    let r = scorer.score(text, tenure, class, None);
                    assert!(r.score <= 100);
                    assert_eq!(r.level, ChurnLevel::from_score(r.score));
                }
            }
        }
    }

    #[test]
    fn semantic_profile_uses_signals() {
        let signals = SentimentSignals {
            label: SentimentLabel::Neg,
            hate_score: 0.5,
            urgency: UrgencyLevel::Critical,
        };
        // base 20 + NEG 30 + hate 20 + Correctivo 25 + tenure 40 + urgency 20
        let result = semantic_scorer().score("da igual", 0.3, Classification::Correctivo, Some(signals));
        assert_eq!(result.score, 100);
    }

    #[test]
    fn semantic_profile_neutral_positive_labels() {
        let neu = SentimentSignals {
            label: SentimentLabel::Neu,
            hate_score: 0.0,
            urgency: UrgencyLevel::Low,
        };
        let pos = SentimentSignals { label: SentimentLabel::Pos, ..neu };
        // base 20 + NEU 10 + Evolutivo -15 + tenure 0 = 15
        let r_neu = semantic_scorer().score("x", 3.0, Classification::Evolutivo, Some(neu));
        assert_eq!(r_neu.score, 15);
        // base 20 + POS 0 + Evolutivo -15 = 5
        let r_pos = semantic_scorer().score("x", 3.0, Classification::Evolutivo, Some(pos));
        assert_eq!(r_pos.score, 5);
    }

    #[test]
    fn semantic_profile_degrades_to_lexical_without_signals() {
        // Analyzer unavailable: the lexical term still scores the text.
        let result = semantic_scorer().score(
            "el servicio es pésimo y lento",
            3.0,
            Classification::Correctivo,
            None,
        );
        // base 20 + lexical 30 + Correctivo 25 = 75
        assert_eq!(result.score, 75);
        assert_eq!(result.level, ChurnLevel::Alto);
    }

    #[test]
    fn profiles_resolve_by_name() {
        assert_eq!(ChurnWeights::by_name("heuristic_v1").unwrap().base, 30);
        assert_eq!(ChurnWeights::by_name("semantic_v1").unwrap().base, 20);
        assert!(ChurnWeights::by_name("v99").is_none());
    }
}
