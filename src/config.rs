// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO RUNTIME, LLM, BUSCA E PESQUISA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Todas as configurações podem ser definidas via .env. O núcleo do agente não
// lê variáveis de ambiente: recebe clientes já construídos a partir daqui.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::time::Duration;

/// Número máximo de iterações do loop de pesquisa.
///
/// Limite rígido; não é configurável em runtime.
pub const MAX_ITERATIONS: u32 = 3;

/// Resultados pedidos ao provedor de busca por pergunta dentro do loop
pub const DEFAULT_RESULTS_PER_QUESTION: usize = 3;

/// Modelo padrão do provedor LLM
pub const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-20250514";

/// URL base padrão da API de mensagens
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.anthropic.com/v1";

/// URL base padrão da API de busca
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.tavily.com";

/// Erros de configuração
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Variável obrigatória ausente ou vazia
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    /// Valor presente mas inválido
    #[error("Invalid value for {var}: {value}")]
    InvalidValue {
        /// Nome da variável
        var: &'static str,
        /// Valor encontrado
        value: String,
    },
}

/// Configuração do cliente LLM
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chave da API
    pub api_key: String,
    /// Identificador do modelo
    pub model: String,
    /// URL base da API
    pub base_url: String,
    /// Timeout por requisição
    pub timeout: Duration,
}

impl LlmConfig {
    /// Configuração com valores padrão para a chave informada
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_LLM_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Configuração do cliente de busca
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Chave da API
    pub api_key: String,
    /// URL base da API
    pub base_url: String,
    /// Timeout por requisição
    pub timeout: Duration,
}

impl SearchConfig {
    /// Configuração com valores padrão para a chave informada
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Parâmetros do loop de pesquisa
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Resultados pedidos por pergunta
    pub results_per_question: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            results_per_question: DEFAULT_RESULTS_PER_QUESTION,
        }
    }
}

impl ResearchConfig {
    /// Limite de iterações (constante)
    pub fn max_iterations(&self) -> u32 {
        MAX_ITERATIONS
    }
}

/// Configuração do runtime Tokio.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Número de worker threads do Tokio.
    /// Se None, usa cálculo dinâmico: min(cpu_cores, max_threads).
    pub worker_threads: Option<usize>,

    /// Limite superior para o cálculo dinâmico. Padrão: 16
    pub max_threads: usize,

    /// Nome das threads do runtime.
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_threads: 16,
            thread_name: "research-agent".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Calcula número efetivo de worker threads.
    pub fn effective_worker_threads(&self) -> usize {
        match self.worker_threads {
            Some(threads) => threads,
            None => std::cmp::min(num_cpus::get(), self.max_threads),
        }
    }
}

fn non_empty_var(name: &'static str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    non_empty_var(name).ok_or(ConfigError::MissingVar(name))
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty_var(name) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var: name, value }),
        None => Ok(None),
    }
}

/// Carrega a configuração do LLM.
///
/// Variáveis suportadas:
/// - `ANTHROPIC_API_KEY` (obrigatória)
/// - `LLM_MODEL` (padrão: `claude-sonnet-4-20250514`)
/// - `LLM_API_BASE_URL` (padrão: `https://api.anthropic.com/v1`)
/// - `LLM_TIMEOUT_SECS` (padrão: 120)
pub fn load_llm_config() -> Result<LlmConfig, ConfigError> {
    let mut config = LlmConfig::new(required_var("ANTHROPIC_API_KEY")?);

    if let Some(model) = non_empty_var("LLM_MODEL") {
        config.model = model;
    }
    if let Some(base_url) = non_empty_var("LLM_API_BASE_URL") {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = parse_var::<u64>("LLM_TIMEOUT_SECS")? {
        config.timeout = Duration::from_secs(secs);
    }

    log::info!("📦 LLM: modelo={} base={}", config.model, config.base_url);
    Ok(config)
}

/// Carrega a configuração da busca.
///
/// Variáveis suportadas:
/// - `TAVILY_API_KEY` (obrigatória)
/// - `SEARCH_API_BASE_URL` (padrão: `https://api.tavily.com`)
/// - `SEARCH_TIMEOUT_SECS` (padrão: 30)
pub fn load_search_config() -> Result<SearchConfig, ConfigError> {
    let mut config = SearchConfig::new(required_var("TAVILY_API_KEY")?);

    if let Some(base_url) = non_empty_var("SEARCH_API_BASE_URL") {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = parse_var::<u64>("SEARCH_TIMEOUT_SECS")? {
        config.timeout = Duration::from_secs(secs);
    }

    log::info!("📦 Busca: base={}", config.base_url);
    Ok(config)
}

/// Carrega os parâmetros do loop de pesquisa.
///
/// - `RESEARCH_RESULTS_PER_QUESTION` (padrão: 3, mínimo 1)
pub fn load_research_config() -> Result<ResearchConfig, ConfigError> {
    let mut config = ResearchConfig::default();

    if let Some(n) = parse_var::<usize>("RESEARCH_RESULTS_PER_QUESTION")? {
        if n == 0 {
            return Err(ConfigError::InvalidValue {
                var: "RESEARCH_RESULTS_PER_QUESTION",
                value: n.to_string(),
            });
        }
        config.results_per_question = n;
        log::info!("📦 RESEARCH_RESULTS_PER_QUESTION={}", n);
    }

    Ok(config)
}

/// Carrega configuração do runtime (`TOKIO_THREADS`, `TOKIO_MAX_THREADS`).
pub fn load_runtime_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();

    if let Ok(Some(threads)) = parse_var::<usize>("TOKIO_THREADS") {
        if threads > 0 {
            config.worker_threads = Some(threads);
            log::info!("📦 TOKIO_THREADS={} (fixo)", threads);
        }
    }

    if let Ok(Some(max)) = parse_var::<usize>("TOKIO_MAX_THREADS") {
        if max > 0 {
            config.max_threads = max;
            log::info!("📦 TOKIO_MAX_THREADS={}", max);
        }
    }

    config
}

/// Cria o runtime Tokio com a configuração informada.
pub fn create_tokio_runtime(config: &RuntimeConfig) -> std::io::Result<tokio::runtime::Runtime> {
    let worker_threads = config.effective_worker_threads();
    log::debug!("🚀 Criando runtime Tokio: {} workers", worker_threads);

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name(&config.thread_name)
        .enable_all()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_config_default() {
        let config = ResearchConfig::default();
        assert_eq!(config.results_per_question, 3);
        assert_eq!(config.max_iterations(), MAX_ITERATIONS);
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::new("key");
        assert_eq!(config.model, DEFAULT_LLM_MODEL);
        assert_eq!(config.base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_SEARCH_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_effective_worker_threads() {
        let mut config = RuntimeConfig::default();
        assert_eq!(
            config.effective_worker_threads(),
            std::cmp::min(num_cpus::get(), 16)
        );

        config.worker_threads = Some(4);
        assert_eq!(config.effective_worker_threads(), 4);
    }

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::MissingVar("TAVILY_API_KEY").to_string(),
            "TAVILY_API_KEY environment variable not set"
        );
        let err = ConfigError::InvalidValue {
            var: "LLM_TIMEOUT_SECS",
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "Invalid value for LLM_TIMEOUT_SECS: abc");
    }
}
