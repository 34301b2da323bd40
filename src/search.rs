// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE DE BUSCA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para busca web. Uma requisição HTTP por chamada,
// resultados na ordem de relevância do provedor, truncados em `max_results`.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::types::SearchResult;

/// Número padrão de resultados por busca
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Erros do cliente de busca
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Provedor inalcançável (rede, timeout)
    #[error("Search unavailable: {0}")]
    Unavailable(String),

    /// Resposta HTTP sem sucesso
    #[error("Search API error ({status}): {body}")]
    ApiError {
        /// Código HTTP
        status: u16,
        /// Corpo da resposta (truncado)
        body: String,
    },

    /// Resposta ilegível
    #[error("Invalid search response: {0}")]
    ParseError(String),
}

/// Trait principal para clientes de busca
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Executa uma única busca
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchResult>, SearchError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cliente mock para testes
///
/// Devolve os resultados registrados para a query exata, ou os resultados
/// padrão. Todas as queries recebidas ficam registradas.
#[derive(Debug, Default)]
pub struct MockSearchClient {
    default_results: Vec<SearchResult>,
    per_query: HashMap<String, Vec<SearchResult>>,
    failing: bool,
    queries: Mutex<Vec<String>>,
}

impl MockSearchClient {
    /// Mock sem resultados
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock que devolve os mesmos resultados para qualquer query
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            default_results: results,
            ..Self::default()
        }
    }

    /// Mock em que toda busca falha com `SearchError::Unavailable`
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Registra resultados específicos para uma query
    pub fn with_query_results(mut self, query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        self.per_query.insert(query.into(), results);
        self
    }

    /// Queries recebidas, em ordem
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Número de buscas executadas
    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query.to_string());

        if self.failing {
            return Err(SearchError::Unavailable("mock search offline".into()));
        }

        let results = self.per_query.get(query).unwrap_or(&self.default_results);
        Ok(results.iter().take(max_results).cloned().collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO TAVILY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl From<TavilyResult> for SearchResult {
    fn from(r: TavilyResult) -> Self {
        SearchResult {
            title: r.title.unwrap_or_default(),
            url: r.url.unwrap_or_default(),
            content: r.content.unwrap_or_default(),
        }
    }
}

/// Cliente para a API de busca da Tavily
pub struct TavilyClient {
    api_key: String,
    search_endpoint: String,
    client: reqwest::Client,
}

impl TavilyClient {
    /// Cria o cliente a partir da configuração
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            search_endpoint: format!("{}/search", config.base_url),
            client,
        })
    }

    fn parse_results(body: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        let response: TavilySearchResponse =
            serde_json::from_str(body).map_err(|e| SearchError::ParseError(e.to_string()))?;

        Ok(response
            .results
            .into_iter()
            .take(max_results)
            .map(SearchResult::from)
            .collect())
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let request = TavilySearchRequest {
            query,
            max_results,
            include_answer: false,
            include_raw_content: false,
        };

        let response = self
            .client
            .post(&self.search_endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Unavailable(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let results = Self::parse_results(&body, max_results)?;
        log::debug!("🔍 Busca '{}': {} resultados", query, results.len());
        Ok(results)
    }
}
