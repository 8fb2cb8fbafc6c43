//! Phishing/security filter — the first pipeline stage, with early exit.
//!
//! Scores inbound text for social-engineering intent from three additive
//! signals (lexicon hits, URL shape, sender domain) and an optional
//! trained classifier. Submissions at or above the quarantine threshold
//! are rejected with an opaque error: the caller never learns which
//! signal fired.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::analyzers::PhishingClassifier;
use crate::pipeline::redact::CREDENTIAL_PATTERN;

/// Scores at or above this are quarantined.
pub const QUARANTINE_THRESHOLD: f32 = 0.8;

/// Contribution per matched lexicon phrase.
const KEYWORD_WEIGHT: f32 = 0.25;

/// Urgency, credential-request and brand-impersonation phrases,
/// matched as case-insensitive substrings.
const PHISHING_LEXICON: &[&str] = &[
    "verifique",
    "urgente",
    "confirmar",
    "contraseña",
    "reset",
    "actualice",
    "inicie sesión",
    "haz clic",
    "gratis",
    "obligatorio",
    "actividad sospechosa",
    "restablecer",
];

const LINK_SHORTENERS: &[&str] = &["bit.ly", "tinyurl", "t.co"];

/// Security filter over a fixed lexicon plus URL/sender heuristics.
pub struct SecurityFilter {
    url_re: Regex,
    ip_host_re: Regex,
    credential_re: Regex,
    trusted_domains: Vec<String>,
    classifier: Option<Arc<dyn PhishingClassifier>>,
    model_timeout: Duration,
}

impl SecurityFilter {
    pub fn new(trusted_domains: Vec<String>) -> Self {
        Self {
            url_re: Regex::new(r"https?://[^\s]+").unwrap(),
            ip_host_re: Regex::new(r"^https?://\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").unwrap(),
            credential_re: Regex::new(CREDENTIAL_PATTERN).unwrap(),
            trusted_domains,
            classifier: None,
            model_timeout: Duration::from_secs(5),
        }
    }

    /// Attach an optional trained classifier. Selected at startup;
    /// absence is a configuration state, not an error path.
    pub fn with_classifier(
        mut self,
        classifier: Arc<dyn PhishingClassifier>,
        model_timeout: Duration,
    ) -> Self {
        self.classifier = Some(classifier);
        self.model_timeout = model_timeout;
        self
    }

    /// Phishing score in [0,1] for a submission.
    ///
    /// With no classifier this is the pure additive heuristic. With a
    /// classifier, its probability over credential-masked text becomes
    /// the base and the asymmetric compounding rules apply; classifier
    /// failure or timeout degrades to the heuristic.
    pub async fn score(&self, text: &str, sender_domain: Option<&str>) -> f32 {
        let heuristic = self.heuristic_score(text, sender_domain);

        let Some(classifier) = &self.classifier else {
            return heuristic;
        };

        let masked = self
            .credential_re
            .replace_all(text, "password=[REDACTED]")
            .into_owned();

        match tokio::time::timeout(self.model_timeout, classifier.phishing_probability(&masked))
            .await
        {
            Ok(Ok(probability)) => self.refine(probability, text),
            Ok(Err(e)) => {
                warn!(classifier = classifier.name(), error = %e, "Classifier failed, using heuristic score");
                heuristic
            }
            Err(_) => {
                warn!(
                    classifier = classifier.name(),
                    timeout_secs = self.model_timeout.as_secs(),
                    "Classifier timed out, using heuristic score"
                );
                heuristic
            }
        }
    }

    /// True if the score warrants quarantine.
    pub fn is_blocked(score: f32) -> bool {
        score >= QUARANTINE_THRESHOLD
    }

    fn heuristic_score(&self, text: &str, sender_domain: Option<&str>) -> f32 {
        let t = text.to_lowercase();
        let mut score = 0.0f32;

        for phrase in PHISHING_LEXICON {
            if t.contains(phrase) {
                score += KEYWORD_WEIGHT;
            }
        }

        for url in self.url_re.find_iter(text) {
            score += self.url_suspicion(url.as_str());
        }

        if let Some(domain) = sender_domain
            && !self
                .trusted_domains
                .iter()
                .any(|d| d.eq_ignore_ascii_case(domain))
        {
            score += 0.1;
        }

        score.clamp(0.0, 1.0)
    }

    /// Per-URL suspicion: raw-IP hosts are maximal, known shorteners
    /// high, abnormally short/long registrable domains moderate.
    fn url_suspicion(&self, url: &str) -> f32 {
        if self.ip_host_re.is_match(url) {
            return 1.0;
        }
        if LINK_SHORTENERS.iter().any(|s| url.contains(s)) {
            return 0.8;
        }
        match registrable_domain(url) {
            Some((label, domain)) => {
                if label.len() < 3 || domain.len() > 25 {
                    0.6
                } else {
                    0.0
                }
            }
            None => 0.2,
        }
    }

    /// Apply the classifier-mode compounding rules to a base probability.
    ///
    /// Only two combinations carry explicit policy; the rest fall
    /// through to the bare classifier score on purpose.
    fn refine(&self, probability: f32, text: &str) -> f32 {
        let link_count = self.url_re.find_iter(text).count();
        let has_credential = self.credential_re.is_match(text);

        // A legitimate user pasting their own forgotten password looks
        // structurally like credential phishing; when the classifier
        // reads the text as low-risk support, its semantic judgment
        // wins over the raw credential signal.
        if has_credential && probability < 0.4 {
            debug!(probability, "Credential present but classifier reads support intent");
            return probability.clamp(0.0, 1.0);
        }

        let mut score = probability;
        if link_count > 0 && probability > 0.4 {
            score += link_count as f32 * 0.2;
        }
        if has_credential && probability > 0.7 {
            score += 0.2;
        }
        score.clamp(0.0, 1.0)
    }
}

/// Extract (second-level label, registrable domain) from a URL, e.g.
/// `https://mail.example.com/x` → ("example", "example.com").
fn registrable_domain(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.split(':').next()?.trim_end_matches('.');

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return None;
    }
    let label = labels[labels.len() - 2];
    let domain = format!("{}.{}", label, labels[labels.len() - 1]);
    Some((label.to_string(), domain))
}
