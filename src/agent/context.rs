// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONTEXTO DO AGENTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;

use uuid::Uuid;

use super::findings::FindingSet;
use crate::types::{Question, RunLog, RunResult};
use crate::utils::TimingStats;

/// Contexto acumulado durante uma execução
///
/// Criado do zero a cada chamada de `research()`; nada sobrevive entre
/// execuções. Contém:
/// - Findings deduplicados
/// - Perguntas já buscadas (só cresce)
/// - Log de status
#[derive(Debug, Clone)]
pub struct ResearchContext {
    /// Identificador da execução (prefixo dos logs)
    pub run_id: Uuid,

    /// Tópico já normalizado
    pub topic: String,

    /// Findings aceitos
    pub findings: FindingSet,

    /// Perguntas já enviadas à busca
    pub searched: HashSet<Question>,

    /// Mensagens de status
    pub log: RunLog,

    /// Passadas de iteração completas
    pub iterations: u32,

    /// Tempos das chamadas externas
    pub timing: TimingStats,
}

impl ResearchContext {
    /// Cria um contexto vazio para o tópico
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            topic: topic.into(),
            findings: FindingSet::new(),
            searched: HashSet::new(),
            log: RunLog::new(),
            iterations: 0,
            timing: TimingStats::new(),
        }
    }

    /// Prefixo curto do run id para logs
    pub fn short_id(&self) -> String {
        self.run_id.simple().to_string()[..8].to_string()
    }

    /// Marca a pergunta como buscada; `false` se já estava no conjunto
    pub fn mark_searched(&mut self, question: &str) -> bool {
        self.searched.insert(question.to_string())
    }

    /// Verifica se a pergunta já foi buscada
    pub fn is_searched(&self, question: &str) -> bool {
        self.searched.contains(question)
    }

    /// Filtra as perguntas ainda não buscadas
    pub fn novel_questions(&self, questions: &[Question]) -> Vec<Question> {
        questions
            .iter()
            .filter(|q| !self.is_searched(q))
            .cloned()
            .collect()
    }

    /// Monta o resultado final
    pub fn into_result(self, report: String) -> RunResult {
        RunResult {
            report,
            findings_count: self.findings.len(),
            sources_count: self.findings.sources_count(),
            iterations: self.iterations,
            log: self.log,
            findings: self.findings.into_vec(),
            timing: self.timing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Finding;

    #[test]
    fn test_searched_set_only_grows() {
        let mut ctx = ResearchContext::new("topic");
        assert!(ctx.mark_searched("Q1"));
        assert!(!ctx.mark_searched("Q1"));
        assert!(ctx.is_searched("Q1"));
        assert!(!ctx.is_searched("q1"));

        let novel = ctx.novel_questions(&["Q1".into(), "Q2".into()]);
        assert_eq!(novel, vec!["Q2".to_string()]);
    }

    #[test]
    fn test_into_result_counts() {
        let mut ctx = ResearchContext::new("topic");
        ctx.findings.insert(Finding::new("A", "S", "https://a.com"));
        ctx.findings.insert(Finding::new("B", "S", "https://a.com"));
        ctx.iterations = 2;
        ctx.log.push("done");

        let result = ctx.into_result("# Report".into());
        assert_eq!(result.findings_count, 2);
        assert_eq!(result.sources_count, 1);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.log.len(), 1);
        assert_eq!(result.findings.len(), 2);
    }

    #[test]
    fn test_short_id_len() {
        let ctx = ResearchContext::new("topic");
        assert_eq!(ctx.short_id().len(), 8);
    }
}
