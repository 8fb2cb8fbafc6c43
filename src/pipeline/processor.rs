//! Ticket processor — sequences the intake stages and assembles the record.
//!
//! Flow:
//! 1. Validation (text present)
//! 2. Security filter — hard stop at the quarantine threshold
//! 3. PII redaction
//! 4. Client context resolution (never fails)
//! 5. Classification, churn scoring, insight — on deidentified text only
//! 6. Store append — assigns the ticket id
//!
//! Any stage failure aborts before the store is touched: the store never
//! holds a partially-populated ticket, and quarantined submissions leave
//! no trace beyond a log line.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::analyzers::{SentimentAnalyzer, SentimentSignals};
use crate::clients::ClientDirectory;
use crate::error::PipelineError;
use crate::pipeline::churn::ChurnScorer;
use crate::pipeline::classify::classify;
use crate::pipeline::insight::generate_insight;
use crate::pipeline::redact::PiiRedactor;
use crate::pipeline::security::SecurityFilter;
use crate::pipeline::types::{ProcessedTicket, Ticket, TicketRequest, TicketStatus};
use crate::store::TicketStore;

/// Ticket processor — owns the stage instances, shares the store and
/// client directory with the service layer.
pub struct TicketProcessor {
    security: SecurityFilter,
    redactor: PiiRedactor,
    directory: Arc<ClientDirectory>,
    scorer: ChurnScorer,
    sentiment: Arc<dyn SentimentAnalyzer>,
    store: Arc<TicketStore>,
}

impl TicketProcessor {
    pub fn new(
        security: SecurityFilter,
        directory: Arc<ClientDirectory>,
        scorer: ChurnScorer,
        sentiment: Arc<dyn SentimentAnalyzer>,
        store: Arc<TicketStore>,
    ) -> Self {
        Self {
            security,
            redactor: PiiRedactor::new(),
            directory,
            scorer,
            sentiment,
            store,
        }
    }

    /// Run a submission through the full pipeline.
    ///
    /// Returns the stored ticket plus the ephemeral PII map. The map
    /// must only travel through secured side-channels.
    pub async fn process(&self, request: TicketRequest) -> Result<ProcessedTicket, PipelineError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(PipelineError::MissingField("text".into()));
        }

        info!(
            client_id = %request.client_id,
            source = ?request.source,
            "Processing ticket submission"
        );

        // Security filter — early exit, opaque to the caller.
        let sender_domain = request
            .client_email
            .as_deref()
            .and_then(|e| e.rsplit_once('@'))
            .map(|(_, domain)| domain);
        let phishing_score = self.security.score(text, sender_domain).await;
        if SecurityFilter::is_blocked(phishing_score) {
            warn!(
                client_id = %request.client_id,
                score = phishing_score,
                "Submission quarantined by security filter"
            );
            return Err(PipelineError::SecurityBlock {
                score: phishing_score,
            });
        }

        let redaction = self.redactor.redact(text);
        let profile = self
            .directory
            .resolve(&request.client_id, request.client_email.as_deref());

        let classification = classify(&redaction.deidentified_text);
        let signals = self.analyze_sentiment(&redaction.deidentified_text).await;
        let churn = self.scorer.score(
            &redaction.deidentified_text,
            profile.antiguedad,
            classification,
            signals,
        );
        let insight = generate_insight(
            churn.score,
            classification,
            &profile.proyecto,
            profile.antiguedad,
        );

        let ticket = Ticket {
            // Placeholder; the store assigns the real id at append.
            id: 0,
            client_id: request.client_id.clone(),
            client_email: request
                .client_email
                .clone()
                .unwrap_or_else(|| profile.client_email.clone()),
            client_name: request.client_name.clone().unwrap_or_default(),
            text_original: text.to_string(),
            redacted_text: redaction.redacted_text,
            deidentified_text: redaction.deidentified_text,
            classification,
            churn_score: churn.score,
            churn_level: churn.level,
            churn_color: churn.level.color().to_string(),
            insight,
            status: TicketStatus::Processed,
            source: request.source.unwrap_or_default(),
            phishing_score,
            project: profile.proyecto,
            sector: profile.sector,
            tenure_years: profile.antiguedad,
            created_at: Utc::now(),
            resolved_by: None,
            resolved_at: None,
        };

        let ticket = self.store.append(ticket).await;
        info!(
            id = ticket.id,
            score = ticket.churn_score,
            level = ?ticket.churn_level,
            classification = classification.label(),
            "Ticket accepted"
        );

        Ok(ProcessedTicket {
            ticket,
            pii_map: redaction.pii_map,
        })
    }

    /// Analyzer call with graceful degradation: any failure yields
    /// `None` and the scorer falls back to its lexical term.
    async fn analyze_sentiment(&self, deidentified: &str) -> Option<SentimentSignals> {
        match self.sentiment.analyze(deidentified).await {
            Ok(signals) => Some(signals),
            Err(e) => {
                debug!(analyzer = self.sentiment.name(), error = %e, "Sentiment analyzer unavailable, scoring lexically");
                None
            }
        }
    }
}
