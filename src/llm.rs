// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para completions de texto. Uma requisição por
// chamada, sem streaming. O parsing da saída fica com quem chama.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::LlmConfig;

/// Versão exigida no header `anthropic-version`
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Limite padrão de tokens de saída por completion
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Erros do cliente LLM
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Falha de transporte (rede, timeout, DNS)
    #[error("LLM unavailable: {0}")]
    Unavailable(String),

    /// Provedor sinalizou throttling (HTTP 429)
    #[error("LLM rate limit exceeded")]
    RateLimited,

    /// Resposta HTTP sem sucesso
    #[error("LLM API error ({status}): {body}")]
    ApiError {
        /// Código HTTP
        status: u16,
        /// Corpo da resposta (truncado)
        body: String,
    },

    /// Envelope de resposta do provedor ilegível
    #[error("Invalid response format: {0}")]
    ParseError(String),
}

impl LlmError {
    /// Verifica se o erro é de rate limit
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited)
    }
}

/// Requisição de completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Prompt do usuário
    pub prompt: String,
    /// Instrução de sistema opcional
    pub system: Option<String>,
    /// Limite de tokens da resposta
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Cria uma requisição com o limite padrão de tokens
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Define a instrução de sistema
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Define o limite de tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait principal para clientes LLM
///
/// Qualquer provedor implementa apenas `complete`. O agente recebe o cliente
/// já construído, o que permite trocar por stubs determinísticos nos testes.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Executa uma completion e retorna o texto bruto
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cliente mock com respostas roteirizadas.
///
/// Cada chamada consome a próxima resposta da fila. Com a fila vazia, devolve
/// a resposta de fallback (se houver) ou `LlmError::Unavailable`. Todas as
/// requisições recebidas ficam registradas.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    /// Mock sem respostas (toda chamada falha)
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock que responde sempre o mesmo texto
    pub fn always(text: impl Into<String>) -> Self {
        Self::new().with_fallback(text)
    }

    /// Enfileira uma resposta de sucesso
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Enfileira um erro
    pub fn fail(self, error: LlmError) -> Self {
        self.push(Err(error));
        self
    }

    /// Resposta usada quando a fila se esgota
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    fn push(&self, item: Result<String, LlmError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(item);
    }

    /// Requisições recebidas até agora
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Número de chamadas recebidas
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(item) => item,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| LlmError::Unavailable("mock script exhausted".into())),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO ANTHROPIC (Messages API)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Cliente para a Messages API da Anthropic
pub struct AnthropicClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Cria o cliente a partir da configuração
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            client,
        })
    }

    /// Troca o modelo
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "messages": [{ "role": "user", "content": request.prompt }],
        });
        if let Some(system) = &request.system {
            body["system"] = serde_json::Value::String(system.clone());
        }
        body
    }

    fn map_status(status: reqwest::StatusCode, body: &str) -> LlmError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return LlmError::RateLimited;
        }
        LlmError::ApiError {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        }
    }

    fn parse_text(body: &str) -> Result<String, LlmError> {
        let response: MessagesResponse =
            serde_json::from_str(body).map_err(|e| LlmError::ParseError(e.to_string()))?;

        Ok(response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/messages", self.base_url);
        log::debug!(
            "🤖 LLM request: model={} max_tokens={} prompt_chars={}",
            self.model,
            request.max_tokens,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Unavailable(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::map_status(status, &body));
        }

        Self::parse_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_script_then_fallback() {
        let client = MockLlmClient::new()
            .respond("first")
            .fail(LlmError::RateLimited)
            .with_fallback("[]");

        let req = CompletionRequest::new("prompt");
        assert_eq!(client.complete(&req).await.unwrap(), "first");
        assert!(client.complete(&req).await.unwrap_err().is_rate_limit());
        assert_eq!(client.complete(&req).await.unwrap(), "[]");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_client_exhausted_is_unavailable() {
        let client = MockLlmClient::new();
        let err = client
            .complete(&CompletionRequest::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[test]
    fn test_completion_request_builder() {
        let req = CompletionRequest::new("hello")
            .with_system("be brief")
            .with_max_tokens(512);
        assert_eq!(req.prompt, "hello");
        assert_eq!(req.system.as_deref(), Some("be brief"));
        assert_eq!(req.max_tokens, 512);
        assert_eq!(CompletionRequest::new("x").max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_anthropic_body_and_status_mapping() {
        let client = AnthropicClient::from_config(&LlmConfig::new("key")).unwrap();
        let body = client.build_body(
            &CompletionRequest::new("hi")
                .with_system("sys")
                .with_max_tokens(4096),
        );
        assert_eq!(body["model"], crate::config::DEFAULT_LLM_MODEL);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["system"], "sys");

        let no_system = client.build_body(&CompletionRequest::new("hi"));
        assert!(no_system.get("system").is_none());

        assert!(AnthropicClient::map_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "")
            .is_rate_limit());
        assert!(matches!(
            AnthropicClient::map_status(reqwest::StatusCode::BAD_GATEWAY, "oops"),
            LlmError::ApiError { status: 502, .. }
        ));
    }

    #[test]
    fn test_anthropic_parse_text_joins_text_blocks() {
        let body = r#"{"content":[{"type":"text","text":"Hello "},{"type":"tool_use","id":"x"},{"type":"text","text":"world"}]}"#;
        assert_eq!(AnthropicClient::parse_text(body).unwrap(), "Hello world");
        assert!(AnthropicClient::parse_text("not json").is_err());
    }
}
