// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ESTADOS DO AGENTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::types::Question;

/// Estado da pesquisa - transições explícitas
///
/// `Planning → Iterating → Synthesizing → Done`. `Iterating` pode se repetir
/// (com `iteration` crescente) até o limite de iterações.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResearchState {
    /// Gerando as perguntas iniciais
    Planning,

    /// Executando uma passada busca → extração → análise de gaps
    Iterating {
        /// Índice da iteração (0-based)
        iteration: u32,
        /// Perguntas pendentes para esta iteração
        pending: Vec<Question>,
    },

    /// Gerando o relatório final
    Synthesizing {
        /// Motivo da saída do loop
        reason: StopReason,
    },

    /// Estado terminal
    Done,
}

/// Motivo pelo qual o loop de iteração terminou
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Análise de gaps retornou lista vazia
    NoGaps,
    /// Todas as perguntas de follow-up já tinham sido buscadas
    NoNovelQuestions,
    /// Limite de iterações atingido
    IterationCap,
    /// Chamada de análise de gaps falhou
    GapAnalysisFailed,
    /// Saída da análise de gaps não pôde ser interpretada
    UnparseableGaps,
}

impl StopReason {
    /// Descrição curta para logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoGaps => "no-gaps",
            Self::NoNovelQuestions => "no-novel-questions",
            Self::IterationCap => "iteration-cap",
            Self::GapAnalysisFailed => "gap-analysis-failed",
            Self::UnparseableGaps => "unparseable-gaps",
        }
    }
}

impl ResearchState {
    /// Nome da fase
    pub fn name(&self) -> &'static str {
        match self {
            Self::Planning => "PLANNING",
            Self::Iterating { .. } => "ITERATING",
            Self::Synthesizing { .. } => "SYNTHESIZING",
            Self::Done => "DONE",
        }
    }

    /// Verifica se o estado é terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Verifica se uma transição é válida
    pub fn can_transition_to(&self, target: &ResearchState) -> bool {
        match (self, target) {
            (Self::Planning, Self::Iterating { iteration: 0, .. }) => true,
            (Self::Iterating { iteration: a, .. }, Self::Iterating { iteration: b, .. }) => {
                *b == *a + 1
            }
            (Self::Iterating { .. }, Self::Synthesizing { .. }) => true,
            (Self::Synthesizing { .. }, Self::Done) => true,
            // Done é terminal
            _ => false,
        }
    }
}

/// Erros que impedem uma pesquisa de começar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResearchError {
    /// Tópico ausente ou vazio
    #[error("{0}")]
    InvalidInput(String),
}

impl ResearchError {
    /// Erro padrão para tópico ausente
    pub fn missing_topic() -> Self {
        Self::InvalidInput("Topic is required".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iterating(iteration: u32) -> ResearchState {
        ResearchState::Iterating {
            iteration,
            pending: vec!["q".into()],
        }
    }

    #[test]
    fn test_state_transitions() {
        let synth = ResearchState::Synthesizing {
            reason: StopReason::NoGaps,
        };

        // Transições válidas
        assert!(ResearchState::Planning.can_transition_to(&iterating(0)));
        assert!(iterating(0).can_transition_to(&iterating(1)));
        assert!(iterating(2).can_transition_to(&synth));
        assert!(synth.can_transition_to(&ResearchState::Done));

        // Transições inválidas
        assert!(!ResearchState::Planning.can_transition_to(&iterating(1)));
        assert!(!ResearchState::Planning.can_transition_to(&synth));
        assert!(!iterating(1).can_transition_to(&iterating(1)));
        assert!(!synth.can_transition_to(&iterating(0)));
        assert!(!ResearchState::Done.can_transition_to(&ResearchState::Planning));
    }

    #[test]
    fn test_is_terminal() {
        assert!(ResearchState::Done.is_terminal());
        assert!(!ResearchState::Planning.is_terminal());
        assert!(!iterating(0).is_terminal());
    }

    #[test]
    fn test_names() {
        assert_eq!(ResearchState::Planning.name(), "PLANNING");
        assert_eq!(iterating(0).name(), "ITERATING");
        assert_eq!(StopReason::IterationCap.as_str(), "iteration-cap");
        assert_eq!(ResearchError::missing_topic().to_string(), "Topic is required");
    }
}
