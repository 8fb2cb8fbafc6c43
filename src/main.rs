use std::sync::Arc;

use ticket_triage::advisor::{AdvisorConfig, create_advisor};
use ticket_triage::analyzers::LexiconSentiment;
use ticket_triage::api::{AppState, api_routes};
use ticket_triage::channels::{EmailConfig, spawn_email_poller};
use ticket_triage::clients::ClientDirectory;
use ticket_triage::config::AppConfig;
use ticket_triage::pipeline::churn::{ChurnScorer, ChurnWeights};
use ticket_triage::pipeline::processor::TicketProcessor;
use ticket_triage::pipeline::security::SecurityFilter;
use ticket_triage::store::TicketStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::from_env()?;

    // Initialize tracing — rolling daily log file, banner on stderr
    std::fs::create_dir_all(&config.log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "ticket-triage.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .init();

    eprintln!("🎫 Ticket Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/process_ticket", config.http_port);
    eprintln!("   Logs: {}/ticket-triage.log", config.log_dir);

    // ── Pipeline ─────────────────────────────────────────────────────
    let weights = ChurnWeights::by_name(&config.churn_profile).unwrap_or_else(|| {
        eprintln!(
            "   Warning: unknown churn profile '{}', using heuristic_v1",
            config.churn_profile
        );
        ChurnWeights::heuristic_v1()
    });
    eprintln!("   Churn profile: {}", weights.name);

    let store = Arc::new(TicketStore::new());
    let directory = Arc::new(ClientDirectory::seeded());
    let security = SecurityFilter::new(config.trusted_sender_domains.clone());

    let processor = Arc::new(TicketProcessor::new(
        security,
        Arc::clone(&directory),
        ChurnScorer::new(weights),
        Arc::new(LexiconSentiment),
        Arc::clone(&store),
    ));

    // ── Advisor ──────────────────────────────────────────────────────
    let advisor = match AdvisorConfig::from_env() {
        Some(advisor_config) => match create_advisor(&advisor_config) {
            Ok(advisor) => {
                eprintln!("   Advisor: enabled ({})", advisor.model_name());
                Some(advisor)
            }
            Err(e) => {
                eprintln!("   Advisor: failed to initialize ({e}), chat will use fallback");
                None
            }
        },
        None => {
            eprintln!("   Advisor: disabled (no API key)");
            None
        }
    };

    // ── Email channel ────────────────────────────────────────────────
    let email_config = EmailConfig::from_env();
    match &email_config {
        Some(cfg) => {
            eprintln!(
                "   Email: enabled (IMAP: {}, SMTP: {}, poll every {}s)",
                cfg.imap_host, cfg.smtp_host, cfg.poll_interval_secs
            );
            let (_poller, _poller_shutdown) =
                spawn_email_poller(cfg.clone(), Arc::clone(&processor));
        }
        None => eprintln!("   Email: disabled (EMAIL_IMAP_HOST not set)"),
    }

    // ── HTTP API ─────────────────────────────────────────────────────
    let app = api_routes(AppState {
        processor,
        store,
        email_config,
        advisor,
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    tracing::info!(port = config.http_port, "HTTP API started");
    eprintln!("   Listening on 0.0.0.0:{}\n", config.http_port);

    axum::serve(listener, app).await?;

    Ok(())
}
