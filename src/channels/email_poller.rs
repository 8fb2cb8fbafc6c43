//! Inbound mailbox poller — submits unseen emails to the intake pipeline.
//!
//! Timer loop:
//! 1. Fetch unseen messages via IMAP (blocking, in `spawn_blocking`)
//! 2. Drop self-sent mail, disallowed senders, and already-seen ids
//! 3. Submit `{subject} - {body}` through the pipeline with
//!    `source = Email`, sender address as the client lookup key
//!
//! The poller owns its retry policy: any fetch or processing failure is
//! logged and retried on the next tick. Quarantined emails are dropped
//! silently (no ticket), which is the pipeline contract.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::channels::email::{self, EmailConfig, is_sender_allowed};
use crate::error::PipelineError;
use crate::pipeline::processor::TicketProcessor;
use crate::pipeline::types::{TicketRequest, TicketSource};

/// Spawn a background task that polls IMAP and feeds the pipeline.
///
/// Returns a `JoinHandle` and a shutdown flag. Set the flag to stop
/// polling.
pub fn spawn_email_poller(
    config: EmailConfig,
    processor: Arc<TicketProcessor>,
) -> (JoinHandle<()>, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        info!(
            "Email poller started — polling every {}s on {}",
            config.poll_interval_secs, config.imap_host
        );

        let mut seen: HashSet<String> = HashSet::new();
        let mut tick = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));

        loop {
            tick.tick().await;

            if shutdown.load(Ordering::Relaxed) {
                info!("Email poller shutting down");
                return;
            }

            poll_once(&config, &processor, &mut seen).await;
        }
    });

    (handle, shutdown_flag)
}

/// Run a single poll cycle: fetch unseen → filter → submit to pipeline.
async fn poll_once(
    config: &EmailConfig,
    processor: &Arc<TicketProcessor>,
    seen: &mut HashSet<String>,
) {
    let cfg = config.clone();
    let fetch_result = tokio::task::spawn_blocking(move || email::fetch_unseen_imap(&cfg)).await;

    let messages = match fetch_result {
        Ok(Ok(msgs)) => msgs,
        Ok(Err(e)) => {
            error!("Email poll failed: {e}");
            return;
        }
        Err(e) => {
            error!("Email poll task panicked: {e}");
            return;
        }
    };

    if messages.is_empty() {
        return;
    }

    debug!("Fetched {} unseen email(s)", messages.len());

    for msg in messages {
        // Self-loop prevention
        if msg.sender.eq_ignore_ascii_case(&config.from_address) {
            debug!(sender = %msg.sender, "Skipping self-sent email");
            continue;
        }

        if !is_sender_allowed(&config.allowed_senders, &msg.sender) {
            warn!("Blocked email from {}", msg.sender);
            continue;
        }

        if !seen.insert(msg.message_id.clone()) {
            continue;
        }

        let request = TicketRequest {
            text: format!("{} - {}", msg.subject, msg.body.trim()),
            client_id: msg.sender.clone(),
            client_email: Some(msg.sender.clone()),
            client_name: None,
            date: None,
            source: Some(TicketSource::Email),
        };

        match processor.process(request).await {
            Ok(processed) => {
                info!(
                    id = processed.ticket.id,
                    sender = %msg.sender,
                    "Email ticket created"
                );
            }
            Err(PipelineError::SecurityBlock { score }) => {
                warn!(
                    sender = %msg.sender,
                    score,
                    "Email quarantined by security filter"
                );
            }
            Err(e) => {
                error!(sender = %msg.sender, error = %e, "Failed to process email ticket");
            }
        }
    }
}
