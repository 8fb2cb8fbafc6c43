//! Integration tests for the intake REST API.
//!
//! Each test spins up an Axum server on a random port and exercises the
//! real REST contract end to end: intake, listing, resolution, chat.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;

use ticket_triage::analyzers::LexiconSentiment;
use ticket_triage::api::{AppState, api_routes};
use ticket_triage::clients::ClientDirectory;
use ticket_triage::pipeline::churn::{ChurnScorer, ChurnWeights};
use ticket_triage::pipeline::processor::TicketProcessor;
use ticket_triage::pipeline::security::SecurityFilter;
use ticket_triage::store::TicketStore;

/// Maximum time any request is allowed to take before the test hangs.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Start an Axum server on a random port, return (port, store).
async fn start_server() -> (u16, Arc<TicketStore>) {
    let store = Arc::new(TicketStore::new());
    let processor = Arc::new(TicketProcessor::new(
        SecurityFilter::new(vec!["gmail.com".into(), "empresa.com".into()]),
        Arc::new(ClientDirectory::seeded()),
        ChurnScorer::new(ChurnWeights::heuristic_v1()),
        Arc::new(LexiconSentiment),
        Arc::clone(&store),
    ));
    let app = api_routes(AppState {
        processor,
        store: Arc::clone(&store),
        email_config: None,
        advisor: None,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (port, store)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(TEST_TIMEOUT)
        .build()
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (port, _store) = start_server().await;

    let body: Value = client()
        .get(format!("http://127.0.0.1:{port}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn process_list_resolve_round_trip() {
    let (port, _store) = start_server().await;
    let base = format!("http://127.0.0.1:{port}");

    // Reference scenario: six-month client, four negative keywords.
    let resp = client()
        .post(format!("{base}/api/process_ticket"))
        .json(&json!({
            "text": "El servicio es pésimo, muy lento y siempre falla. Estoy molesto.",
            "client_id": "CLIENT-004",
            "source": "Web"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let ticket: Value = resp.json().await.unwrap();
    assert_eq!(ticket["id"], 1);
    assert_eq!(ticket["classification"], "Correctivo");
    assert_eq!(ticket["churn_score"], 100);
    assert_eq!(ticket["churn_level"], "Crítico");
    assert_eq!(ticket["churn_color"], "darkred");
    assert!(ticket["insight"].as_str().unwrap().starts_with("URGENTE"));
    assert!(ticket["insight"].as_str().unwrap().contains("Consultoría IA"));
    assert_eq!(ticket["status"], "Processed");

    // Listing returns the ticket in insertion order.
    let tickets: Vec<Value> = client()
        .get(format!("{base}/api/tickets"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["id"], 1);

    // Resolve it.
    let resp = client()
        .post(format!("{base}/api/tickets/1/resolve"))
        .json(&json!({ "resolved_by": "agente1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resolved: Value = resp.json().await.unwrap();
    assert_eq!(resolved["status"], "resolved");
    assert_eq!(resolved["resolved_by"], "agente1");
    assert!(resolved["resolved_at"].is_string());
}

#[tokio::test]
async fn phishing_submission_gets_opaque_security_block() {
    let (port, store) = start_server().await;
    let base = format!("http://127.0.0.1:{port}");

    let resp = client()
        .post(format!("{base}/api/process_ticket"))
        .json(&json!({
            "text": "URGENTE: verifique su cuenta en http://203.0.113.9/login",
            "client_id": "CLIENT-001"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "SECURITY_BLOCK");
    // Opaque: no score, no matched signal names.
    let raw = body.to_string().to_lowercase();
    assert!(!raw.contains("keyword"));
    assert!(!raw.contains("score"));

    // Quarantined submissions leave no ticket behind.
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn missing_text_is_descriptive_validation_error() {
    let (port, store) = start_server().await;

    let resp = client()
        .post(format!("http://127.0.0.1:{port}/api/process_ticket"))
        .json(&json!({ "client_id": "CLIENT-001" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("text"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn resolving_unknown_ticket_is_not_found() {
    let (port, _store) = start_server().await;

    let resp = client()
        .post(format!("http://127.0.0.1:{port}/api/tickets/99/resolve"))
        .json(&json!({ "resolved_by": "agente1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Ticket no encontrado");
}

#[tokio::test]
async fn chat_without_advisor_uses_fallback_reply() {
    let (port, _store) = start_server().await;
    let base = format!("http://127.0.0.1:{port}");

    let resp = client()
        .post(format!("{base}/api/chat"))
        .json(&json!({
            "message": "¿Cómo manejo este cliente?",
            "contexto": { "client_name": "ACME", "churn_score": 70 }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert!(body["reply"].as_str().unwrap().contains("no está disponible"));
}

#[tokio::test]
async fn chat_rejects_empty_message() {
    let (port, _store) = start_server().await;

    let resp = client()
        .post(format!("http://127.0.0.1:{port}/api/chat"))
        .json(&json!({ "message": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn unknown_client_submission_succeeds_with_default_profile() {
    let (port, _store) = start_server().await;

    let resp = client()
        .post(format!("http://127.0.0.1:{port}/api/process_ticket"))
        .json(&json!({
            "text": "Quisiera cotizar un módulo adicional de reportes",
            "client_id": "CLIENT-999"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let ticket: Value = resp.json().await.unwrap();
    assert_eq!(ticket["project"], "Sin Proyecto Asignado");
    assert_eq!(ticket["tenure_years"], 0.0);
    assert_eq!(ticket["classification"], "Evolutivo");
}

#[tokio::test]
async fn redacted_fields_carry_no_raw_pii() {
    let (port, _store) = start_server().await;

    let resp = client()
        .post(format!("http://127.0.0.1:{port}/api/process_ticket"))
        .json(&json!({
            "text": "Mi correo es juan@cliente.com y la app da error al guardar",
            "client_id": "CLIENT-002"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let ticket: Value = resp.json().await.unwrap();
    let redacted = ticket["redacted_text"].as_str().unwrap();
    let deidentified = ticket["deidentified_text"].as_str().unwrap();
    assert!(!redacted.contains("juan@cliente.com"));
    assert!(redacted.contains("<EMAIL_HASH:"));
    assert!(!deidentified.contains('@'));
    assert!(!deidentified.contains("HASH"));
}
