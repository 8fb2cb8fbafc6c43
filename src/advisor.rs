//! Advisory collaborator — internal recommendations for account managers.
//!
//! Given an agent's free-text query plus ticket context, returns an
//! LLM-generated internal recommendation. Supports:
//! - **Anthropic**: direct API access via rig-core
//! - **OpenAI**: direct API access via rig-core
//!
//! The advisor is optional: no API key means no advisor, which is a
//! configuration state. The HTTP layer answers with a fallback reply in
//! that case — the LLM path never fails a request.

use std::sync::Arc;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// Reply used whenever the advisor is unconfigured or failing.
pub const FALLBACK_REPLY: &str = "Lo siento, el servicio de IA no está disponible en este momento.";

/// Supported advisor backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorBackend {
    Anthropic,
    OpenAi,
}

/// Configuration for creating an advisor.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub backend: AdvisorBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
}

impl AdvisorConfig {
    /// Build config from environment variables.
    /// Returns `None` if no API key is set (advisor disabled).
    pub fn from_env() -> Option<Self> {
        let backend = match std::env::var("TRIAGE_ADVISOR_BACKEND").as_deref() {
            Ok("openai") => AdvisorBackend::OpenAi,
            _ => AdvisorBackend::Anthropic,
        };

        let key_var = match backend {
            AdvisorBackend::Anthropic => "ANTHROPIC_API_KEY",
            AdvisorBackend::OpenAi => "OPENAI_API_KEY",
        };
        let api_key = std::env::var(key_var).ok()?;

        let model = std::env::var("TRIAGE_ADVISOR_MODEL").unwrap_or_else(|_| match backend {
            AdvisorBackend::Anthropic => "claude-sonnet-4-20250514".to_string(),
            AdvisorBackend::OpenAi => "gpt-4o".to_string(),
        });

        Some(Self {
            backend,
            api_key: secrecy::SecretString::from(api_key),
            model,
        })
    }
}

/// Ticket context handed to the advisor alongside the agent's query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketContext {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub ticket_id: Option<u64>,
    #[serde(default)]
    pub churn_score: u8,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub antiquity: f32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ticket_text: String,
}

/// Advisory capability — treated as a black box by the pipeline.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Model identifier for logging.
    fn model_name(&self) -> &str;

    /// Generate an internal recommendation for the account manager.
    async fn recommend(&self, query: &str, context: &TicketContext)
    -> Result<String, AdvisorError>;
}

/// Create an advisor from configuration.
pub fn create_advisor(config: &AdvisorConfig) -> Result<Arc<dyn Advisor>, AdvisorError> {
    let client = match config.backend {
        AdvisorBackend::Anthropic => {
            use rig::providers::anthropic;

            let client: rig::client::Client<anthropic::client::AnthropicExt> =
                anthropic::Client::new(config.api_key.expose_secret()).map_err(|e| {
                    AdvisorError::RequestFailed {
                        provider: "anthropic".to_string(),
                        reason: format!("Failed to create Anthropic client: {}", e),
                    }
                })?;
            ClientKind::Anthropic(client)
        }
        AdvisorBackend::OpenAi => {
            use rig::providers::openai;

            let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
                openai::Client::new(config.api_key.expose_secret()).map_err(|e| {
                    AdvisorError::RequestFailed {
                        provider: "openai".to_string(),
                        reason: format!("Failed to create OpenAI client: {}", e),
                    }
                })?;
            ClientKind::OpenAi(client)
        }
    };

    tracing::info!("Advisor enabled (model: {})", config.model);
    Ok(Arc::new(RigAdvisor {
        client,
        model: config.model.clone(),
    }))
}

enum ClientKind {
    Anthropic(rig::client::Client<rig::providers::anthropic::client::AnthropicExt>),
    OpenAi(rig::client::Client<rig::providers::openai::client::OpenAIResponsesExt>),
}

/// rig-core backed advisor.
struct RigAdvisor {
    client: ClientKind,
    model: String,
}

const ADVISOR_PREAMBLE: &str = "Actúas como un Account Manager Senior y Customer Success \
Strategist. Analizas tickets de soporte, identificas señales de churn, urgencia y valor del \
cliente, y entregas una recomendación interna para que el AM tome la mejor decisión. NO \
generas mensajes para el cliente: solo la recomendación interna, en tono profesional, \
estratégico y directo, de máximo 10 líneas.";

#[async_trait]
impl Advisor for RigAdvisor {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn recommend(
        &self,
        query: &str,
        context: &TicketContext,
    ) -> Result<String, AdvisorError> {
        let prompt = build_advisor_prompt(query, context);

        let (provider, reply) = match &self.client {
            ClientKind::Anthropic(client) => {
                let agent = client
                    .agent(&self.model)
                    .preamble(ADVISOR_PREAMBLE)
                    .build();
                ("anthropic", agent.prompt(prompt.as_str()).await)
            }
            ClientKind::OpenAi(client) => {
                let agent = client
                    .agent(&self.model)
                    .preamble(ADVISOR_PREAMBLE)
                    .build();
                ("openai", agent.prompt(prompt.as_str()).await)
            }
        };

        reply.map_err(|e| AdvisorError::RequestFailed {
            provider: provider.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Build the advisor prompt from the agent query and ticket context.
fn build_advisor_prompt(query: &str, ctx: &TicketContext) -> String {
    format!(
        "DATOS DEL CLIENTE Y TICKET\n\
         - Cliente: {client}\n\
         - Ticket ID: {ticket_id}\n\
         - Riesgo de Fuga (Churn): {churn}%\n\
         - Proyecto / Servicio: {project}\n\
         - Clasificación: {classification}\n\
         - Antigüedad: {antiquity} años\n\
         - Estado del Ticket: {status}\n\
         - Problema Reportado: \"{text}\"\n\n\
         CONSULTA DEL AGENTE\n\
         \"{query}\"\n\n\
         INSTRUCCIONES\n\
         1. Evalúa el riesgo y la urgencia.\n\
         2. Indica qué acciones debe tomar el AM.\n\
         3. Si el churn supera 30%, sugiere medidas de retención (créditos, descuentos \
            temporales, extensión del servicio, acompañamiento prioritario o llamada \
            ejecutiva de seguimiento).\n\
         4. Si el cliente tiene más de 2 años de antigüedad, resalta el valor de mantener \
            la relación.\n\
         5. Indica la probabilidad de perder al cliente y su impacto en la continuidad \
            del contrato.\n\
         Devuelve SOLO la recomendación interna para el Account Manager.",
        client = if ctx.client_name.is_empty() { "Cliente" } else { &ctx.client_name },
        ticket_id = ctx.ticket_id.map_or_else(|| "N/A".to_string(), |id| id.to_string()),
        churn = ctx.churn_score,
        project = if ctx.project.is_empty() { "N/A" } else { &ctx.project },
        classification = if ctx.classification.is_empty() { "N/A" } else { &ctx.classification },
        antiquity = ctx.antiquity,
        status = if ctx.status.is_empty() { "Abierto" } else { &ctx.status },
        text = ctx.ticket_text,
        query = query,
    )
}
