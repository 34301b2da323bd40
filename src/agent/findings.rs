// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONJUNTO DE FINDINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;

use crate::types::Finding;

/// Findings acumulados, deduplicados por `fact` exato.
///
/// A primeira ocorrência de um `fact` vence; repetições posteriores são
/// descartadas em silêncio, mesmo com `source`/`url` diferentes.
///
/// A comparação é exata (case e espaços). A normalização fica na entrada:
/// [`extract_findings`](crate::utils::json::extract_findings) já entrega o
/// `fact` sem espaços nas pontas e descarta os vazios.
#[derive(Debug, Clone, Default)]
pub struct FindingSet {
    items: Vec<Finding>,
    facts: HashSet<String>,
}

impl FindingSet {
    /// Conjunto vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere um finding; retorna `false` se o `fact` já existia
    pub fn insert(&mut self, finding: Finding) -> bool {
        if self.facts.contains(&finding.fact) {
            return false;
        }
        self.facts.insert(finding.fact.clone());
        self.items.push(finding);
        true
    }

    /// Insere vários findings em ordem; retorna quantos eram novos
    pub fn extend<I: IntoIterator<Item = Finding>>(&mut self, findings: I) -> usize {
        findings.into_iter().filter(|f| self.insert(f.clone())).count()
    }

    /// Número de findings retidos
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Verifica se está vazio
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Findings na ordem de aceitação
    pub fn as_slice(&self) -> &[Finding] {
        &self.items
    }

    /// Número de URLs distintas.
    ///
    /// Findings com `url` vazia não contam como fonte, mesmo que tenham
    /// `source` preenchido.
    pub fn sources_count(&self) -> usize {
        self.items
            .iter()
            .map(|f| f.url.as_str())
            .filter(|u| !u.is_empty())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Consome o conjunto e retorna os findings
    pub fn into_vec(self) -> Vec<Finding> {
        self.items
    }
}
