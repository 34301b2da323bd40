// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};

use crate::utils::TimingStats;

/// Tipo de URL (alias para String)
pub type Url = String;

/// Pergunta de pesquisa (planejada ou vinda da análise de gaps)
pub type Question = String;

/// Resultado de uma busca web
///
/// Efêmero: produzido pelo [`SearchClient`](crate::search::SearchClient) e
/// consumido imediatamente pela extração de findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Título da página
    #[serde(default)]
    pub title: String,
    /// URL do resultado
    #[serde(default)]
    pub url: Url,
    /// Trecho do conteúdo extraído pelo provedor
    #[serde(default)]
    pub content: String,
}

impl SearchResult {
    /// Cria um resultado de busca
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }
}

/// Fato extraído de um resultado de busca, com atribuição de fonte.
///
/// Unidade durável de conhecimento acumulada entre iterações. Dois findings
/// com o mesmo `fact` (comparação exata, case-sensitive) nunca coexistem no
/// conjunto retido.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Informação principal (1-2 frases)
    pub fact: String,
    /// Título da fonte
    #[serde(default)]
    pub source: String,
    /// URL da fonte
    #[serde(default)]
    pub url: Url,
}

impl Finding {
    /// Cria um finding
    pub fn new(fact: impl Into<String>, source: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            fact: fact.into(),
            source: source.into(),
            url: url.into(),
        }
    }

    /// Citação Markdown no formato `[Título](url)`; sem título, a própria URL
    pub fn citation(&self) -> String {
        let source = self.source.trim();
        let label = if source.is_empty() { self.url.as_str() } else { source };
        format!("[{}]({})", label, self.url)
    }
}

/// Log ordenado de mensagens de status de uma execução.
///
/// Só cresce durante a execução; depois de montado o [`RunResult`] é apenas
/// leitura.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunLog(Vec<String>);

impl RunLog {
    /// Cria um log vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona uma mensagem ao final do log
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Número de mensagens
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Verifica se o log está vazio
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Itera sobre as mensagens na ordem em que foram registradas
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Verifica se alguma mensagem contém o trecho informado
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|m| m.contains(needle))
    }

    /// Mensagens como slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Resultado final de uma pesquisa
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Relatório em Markdown
    pub report: String,
    /// Tamanho do conjunto deduplicado de findings
    pub findings_count: usize,
    /// Número de URLs distintas entre os findings retidos.
    ///
    /// Findings sem URL não contam como fonte, então pode ser menor que o
    /// número de `source` distintos.
    pub sources_count: usize,
    /// Número de iterações completas do loop de pesquisa
    pub iterations: u32,
    /// Mensagens de status acumuladas
    pub log: RunLog,
    /// Findings retidos, na ordem em que foram aceitos (fora do envelope)
    #[serde(skip)]
    pub findings: Vec<Finding>,
    /// Tempos das chamadas externas (fora do envelope)
    #[serde(skip)]
    pub timing: TimingStats,
}

/// Envelope de saída servido pelo transporte que envolve o agente.
///
/// Sucesso serializa os campos do [`RunResult`]; erro de entrada serializa
/// apenas `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResearchEnvelope {
    /// Pesquisa concluída
    Success(RunResult),
    /// Entrada inválida ou falha irrecuperável
    Error {
        /// Mensagem de erro
        error: String,
    },
}

impl ResearchEnvelope {
    /// Cria um envelope de erro
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

impl From<RunResult> for ResearchEnvelope {
    fn from(result: RunResult) -> Self {
        Self::Success(result)
    }
}
