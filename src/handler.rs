// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HANDLER DE REQUISIÇÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Converte um corpo `{"topic": "..."}` no envelope JSON de saída, sem depender
// de nenhum framework HTTP. O servidor axum e o CLI `--json` usam este módulo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};

use crate::agent::ResearchAgent;
use crate::types::ResearchEnvelope;
use crate::utils::preview;

/// Corpo esperado da requisição
#[derive(Debug, Default, Deserialize)]
pub struct ResearchRequest {
    /// Tópico a pesquisar
    #[serde(default)]
    pub topic: Option<String>,
}

/// Resposta independente de transporte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// Código HTTP
    pub status_code: u16,
    /// Cabeçalhos (nome, valor)
    pub headers: Vec<(String, String)>,
    /// Corpo JSON serializado
    pub body: String,
}

impl HandlerResponse {
    fn json<T: Serialize>(status_code: u16, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self::with_body(status_code, body),
            Err(e) => {
                log::error!("Falha ao serializar resposta: {}", e);
                Self::with_body(
                    500,
                    serde_json::json!({ "error": "Failed to serialize response" }).to_string(),
                )
            }
        }
    }

    fn error(status_code: u16, message: &str) -> Self {
        Self::json(status_code, &ResearchEnvelope::error(message))
    }

    fn with_body(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            headers: vec![
                ("Content-Type".into(), "application/json".into()),
                ("Access-Control-Allow-Origin".into(), "*".into()),
            ],
            body,
        }
    }

    /// Valor de um cabeçalho (nome case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Processa uma requisição de pesquisa.
///
/// - corpo vazio conta como `{}`
/// - JSON inválido → 400 `Invalid request body`
/// - tópico ausente/vazio → 400 `Topic is required`
/// - sucesso → 200 com o envelope do [`RunResult`](crate::types::RunResult)
pub async fn handle_request(agent: &ResearchAgent, body: &str) -> HandlerResponse {
    let request = if body.trim().is_empty() {
        ResearchRequest::default()
    } else {
        match serde_json::from_str::<ResearchRequest>(body) {
            Ok(request) => request,
            Err(e) => {
                log::warn!("Corpo de requisição inválido: {}", e);
                return HandlerResponse::error(400, "Invalid request body");
            }
        }
    };

    let topic = request.topic.unwrap_or_default();
    if topic.trim().is_empty() {
        return HandlerResponse::error(400, "Topic is required");
    }

    log::info!("📨 Researching: {}", preview(topic.trim(), 80));

    match agent.research(&topic).await {
        Ok(result) => HandlerResponse::json(200, &ResearchEnvelope::from(result)),
        Err(e) => HandlerResponse::error(400, &e.to_string()),
    }
}
