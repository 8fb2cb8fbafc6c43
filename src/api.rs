//! REST API for ticket intake, dashboard listing, resolution, and the
//! advisory chat.
//!
//! Security rejections are mapped to an opaque 400 with code
//! `SECURITY_BLOCK` — no diagnostic specifics ever cross this boundary.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::advisor::{Advisor, FALLBACK_REPLY, TicketContext};
use crate::channels::email::{self, EmailConfig};
use crate::error::PipelineError;
use crate::pipeline::processor::TicketProcessor;
use crate::pipeline::types::TicketRequest;
use crate::store::TicketStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<TicketProcessor>,
    pub store: Arc<TicketStore>,
    /// Email configuration for resolution notifications (None if the
    /// email channel is disabled).
    pub email_config: Option<EmailConfig>,
    /// Advisory LLM (None if unconfigured).
    pub advisor: Option<Arc<dyn Advisor>>,
}

/// Build the Axum router.
///
/// CORS is permissive because the dashboard is a separate browser app.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/process_ticket", post(process_ticket))
        .route("/api/tickets", get(list_tickets))
        .route("/api/tickets/{id}/resolve", post(resolve_ticket))
        .route("/api/chat", post(chat))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "ticket-triage"
    }))
}

// ── Intake ──────────────────────────────────────────────────────────

async fn process_ticket(
    State(state): State<AppState>,
    Json(request): Json<TicketRequest>,
) -> Response {
    match state.processor.process(request).await {
        // The PII map never leaves the processing result: callers get
        // the ticket record only.
        Ok(processed) => (StatusCode::OK, Json(processed.ticket)).into_response(),
        Err(PipelineError::SecurityBlock { .. }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "No se pudo procesar la solicitud",
                "code": "SECURITY_BLOCK",
                "detail": "La solicitud no cumple las políticas de seguridad.",
            })),
        )
            .into_response(),
        Err(PipelineError::MissingField(field)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Falta el campo requerido: {field}") })),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Ticket processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Error interno del servidor" })),
            )
                .into_response()
        }
    }
}

// ── Listing ─────────────────────────────────────────────────────────

async fn list_tickets(State(state): State<AppState>) -> Response {
    Json(state.store.list().await).into_response()
}

// ── Resolution ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    resolved_by: String,
    #[serde(default)]
    message: Option<String>,
}

async fn resolve_ticket(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<ResolveRequest>,
) -> Response {
    match state.store.resolve(id, &request.resolved_by).await {
        Ok(ticket) => {
            // Notify the client by email. Failure to send must not roll
            // back the status transition, so this is fire-and-forget.
            if let Some(config) = state.email_config.clone()
                && !ticket.client_email.is_empty()
            {
                let to = ticket.client_email.clone();
                let message = request
                    .message
                    .unwrap_or_else(|| "Tu solicitud ha sido atendida correctamente.".to_string());
                let ticket_id = ticket.id;
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = email::send_resolution_email(&config, &to, ticket_id, &message)
                    {
                        warn!(ticket_id, error = %e, "Resolution email failed");
                    }
                });
            }
            (StatusCode::OK, Json(ticket)).into_response()
        }
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Ticket no encontrado" })),
        )
            .into_response(),
    }
}

// ── Advisory chat ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    /// The dashboard sends the ticket context as "contexto".
    #[serde(default, alias = "contexto")]
    context: TicketContext,
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "El mensaje no puede estar vacío" })),
        )
            .into_response();
    }

    let reply = match &state.advisor {
        Some(advisor) => match advisor.recommend(&request.message, &request.context).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Advisor request failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        },
        None => FALLBACK_REPLY.to_string(),
    };

    Json(json!({ "reply": reply })).into_response()
}
