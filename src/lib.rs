//! # Research Agent
//!
//! Agente de pesquisa iterativa: recebe um tópico, planeja perguntas, busca na
//! web, extrai findings com um LLM, procura lacunas e sintetiza um relatório
//! Markdown com citações.
//!
//! ## Fluxo
//!
//! 1. **Planning**: LLM gera 4-6 perguntas (fallback: o próprio tópico)
//! 2. **Iterating**: busca → extração → deduplicação → análise de gaps,
//!    no máximo [`MAX_ITERATIONS`] vezes
//! 3. **Synthesizing**: relatório final via LLM, ou relatório local agrupado
//!    por fonte quando o LLM falha
//! 4. **Done**: [`RunResult`] com contagens e log de status
//!
//! Nenhuma falha de busca ou de LLM aborta a execução. O único erro devolvido
//! é tópico vazio.
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use research_agent::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let llm = AnthropicClient::from_config(&load_llm_config()?)?;
//!     let search = TavilyClient::from_config(&load_search_config()?)?;
//!
//!     let agent = ResearchAgent::new(Arc::new(llm), Arc::new(search));
//!     let result = agent.research("AI agents in enterprise software").await?;
//!     println!("{}", result.report);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`SearchResult`]: resultado de uma busca web
/// - [`Finding`]: fato extraído com atribuição de fonte
/// - [`RunLog`]: mensagens de status de uma execução
/// - [`RunResult`]: resultado final
/// - [`ResearchEnvelope`]: envelope JSON de saída
pub mod types;

/// Agente de pesquisa com máquina de estados.
///
/// - `ResearchAgent`: orquestra o loop
/// - `ResearchState`: Planning, Iterating, Synthesizing, Done
/// - `ResearchContext`: findings, perguntas buscadas e log de uma execução
/// - `FindingSet`: deduplicação por `fact` (primeira ocorrência vence)
pub mod agent;

/// Clientes para Large Language Models (LLMs).
///
/// Define a trait `LlmClient` e implementações para:
/// - Anthropic (Messages API)
/// - Mock para testes
pub mod llm;

/// Clientes para busca web.
///
/// Define a trait `SearchClient` e implementações para:
/// - Tavily
/// - Mock para testes
pub mod search;

/// Prompt de síntese e relatório de fallback.
pub mod report;

/// Handler de requisição independente de transporte.
pub mod handler;

/// Utilitários diversos.
///
/// - Extração tolerante de JSON
/// - Truncation e limpeza de texto
/// - Timing
pub mod utils;

/// Configuração via variáveis de ambiente.
///
/// **LLM:**
/// - `ANTHROPIC_API_KEY`: chave da API (obrigatória)
/// - `LLM_MODEL`: modelo (padrão: "claude-sonnet-4-20250514")
/// - `LLM_API_BASE_URL`: URL base customizada (opcional)
/// - `LLM_TIMEOUT_SECS`: timeout por requisição (padrão: 120)
///
/// **Busca:**
/// - `TAVILY_API_KEY`: chave da API (obrigatória)
/// - `SEARCH_API_BASE_URL`: URL base customizada (opcional)
/// - `SEARCH_TIMEOUT_SECS`: timeout por requisição (padrão: 30)
///
/// **Pesquisa / Runtime:**
/// - `RESEARCH_RESULTS_PER_QUESTION`: resultados por pergunta (padrão: 3)
/// - `TOKIO_THREADS`: threads do runtime (padrão: dinâmico)
pub mod config;

/// Servidor HTTP (feature `server`).
#[cfg(feature = "server")]
pub mod server;

// Re-exports principais
pub use agent::{ResearchAgent, ResearchError, StatusCallback};
pub use config::{
    create_tokio_runtime, load_llm_config, load_research_config, load_runtime_config,
    load_search_config, ConfigError, LlmConfig, ResearchConfig, RuntimeConfig, SearchConfig,
    MAX_ITERATIONS,
};
pub use handler::{handle_request, HandlerResponse};
pub use llm::{AnthropicClient, CompletionRequest, LlmClient, LlmError};
pub use search::{SearchClient, SearchError, TavilyClient};
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// ```rust,ignore
/// use research_agent::prelude::*;
/// ```
pub mod prelude {
    pub use crate::agent::{ResearchAgent, ResearchError, StatusCallback};
    pub use crate::config::{load_llm_config, load_search_config, ResearchConfig};
    pub use crate::llm::{AnthropicClient, LlmClient, MockLlmClient};
    pub use crate::report::fallback_report;
    pub use crate::search::{MockSearchClient, SearchClient, TavilyClient};
    pub use crate::types::*;
    pub use crate::utils::extract_json;
}
