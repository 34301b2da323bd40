// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RESEARCH AGENT - MÁQUINA DE ESTADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Planning → Iterating (até MAX_ITERATIONS) → Synthesizing → Done
//
// Todas as chamadas externas são aguardadas uma de cada vez. Falhas de busca
// e de LLM degradam a fase correspondente e nunca abortam a execução.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod context;
mod findings;
/// Prompts de planejamento, extração e análise de gaps.
pub mod prompts;
mod state;

pub use context::ResearchContext;
pub use findings::FindingSet;
pub use state::{ResearchError, ResearchState, StopReason};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::ResearchConfig;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::report::{fallback_report, synthesis_prompt, SYNTHESIS_MAX_TOKENS};
use crate::search::SearchClient;
use crate::types::{Finding, Question, RunResult, SearchResult};
use crate::utils::{extract_findings, extract_string_list, preview, ActionTimer, PREVIEW_CHARS};

use prompts::{EXTRACT_MAX_TOKENS, GAPS_MAX_TOKENS, PLAN_MAX_TOKENS};

/// Callback de progresso, chamado de forma síncrona a cada mensagem de status
pub type StatusCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Agente de pesquisa iterativa
///
/// Recebe os clientes já construídos. Um mesmo agente pode atender várias
/// execuções; cada `research()` cria seu próprio [`ResearchContext`].
pub struct ResearchAgent {
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn SearchClient>,
    config: ResearchConfig,
    on_status: Option<StatusCallback>,
}

impl ResearchAgent {
    /// Cria um agente com configuração padrão
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn SearchClient>) -> Self {
        Self {
            llm,
            search,
            config: ResearchConfig::default(),
            on_status: None,
        }
    }

    /// Define a configuração do loop
    pub fn with_config(mut self, config: ResearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Registra o callback de progresso
    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.on_status = Some(callback);
        self
    }

    /// Configuração em uso
    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Executa a pesquisa completa para um tópico.
    ///
    /// Só falha com [`ResearchError::InvalidInput`] quando o tópico está
    /// vazio. Qualquer outra falha é registrada no log e a execução segue com
    /// os dados parciais, terminando sempre com um relatório não vazio.
    pub async fn research(&self, topic: &str) -> Result<RunResult, ResearchError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::missing_topic());
        }

        let mut ctx = ResearchContext::new(topic);
        log::info!("[{}] 🚀 Iniciando pesquisa: {}", ctx.short_id(), preview(topic, 80));

        let mut state = ResearchState::Planning;
        let mut report = String::new();

        while !state.is_terminal() {
            let next = match &state {
                ResearchState::Planning => {
                    let pending = self.plan(&mut ctx).await;
                    ResearchState::Iterating {
                        iteration: 0,
                        pending,
                    }
                }
                ResearchState::Iterating { iteration, pending } => {
                    self.iterate(&mut ctx, *iteration, pending).await
                }
                ResearchState::Synthesizing { reason } => {
                    report = self.synthesize(&mut ctx, *reason).await;
                    ResearchState::Done
                }
                ResearchState::Done => break,
            };

            debug_assert!(state.can_transition_to(&next));
            log::debug!("[{}] {} → {}", ctx.short_id(), state.name(), next.name());
            state = next;
        }

        log::info!(
            "[{}] ✅ {} findings, {} fontes, {} iterações | {}",
            ctx.short_id(),
            ctx.findings.len(),
            ctx.findings.sources_count(),
            ctx.iterations,
            ctx.timing.summary()
        );

        Ok(ctx.into_result(report))
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // FASES
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Gera as perguntas iniciais; sem perguntas válidas, usa o próprio tópico
    async fn plan(&self, ctx: &mut ResearchContext) -> Vec<Question> {
        self.status(ctx, "Planning research questions...");

        let request = CompletionRequest::new(prompts::plan_prompt(&ctx.topic))
            .with_max_tokens(PLAN_MAX_TOKENS);

        let questions = match self.complete(ctx, &request, "planning").await {
            Ok(text) => match extract_string_list(&text) {
                Some(questions) if !questions.is_empty() => questions,
                _ => {
                    self.warn(
                        ctx,
                        "Planning output could not be parsed, researching the topic directly",
                    );
                    Vec::new()
                }
            },
            Err(e) => {
                self.warn(
                    ctx,
                    format!("Planning failed ({}), researching the topic directly", e),
                );
                Vec::new()
            }
        };

        let questions = if questions.is_empty() {
            vec![ctx.topic.clone()]
        } else {
            questions
        };

        self.status(ctx, format!("Generated {} research questions", questions.len()));
        log::debug!("[{}] Perguntas: {:?}", ctx.short_id(), questions);
        questions
    }

    /// Uma passada busca → extração → análise de gaps
    async fn iterate(
        &self,
        ctx: &mut ResearchContext,
        iteration: u32,
        pending: &[Question],
    ) -> ResearchState {
        let max = self.config.max_iterations();
        self.status(ctx, format!("Research iteration {}/{}", iteration + 1, max));

        for question in pending {
            if !ctx.mark_searched(question) {
                log::debug!("[{}] Já buscada, pulando: {}", ctx.short_id(), question);
                continue;
            }

            let short = preview(question, PREVIEW_CHARS);
            self.status(ctx, format!("Searching: {}", short));

            let results = self.search_question(ctx, question).await;
            if results.is_empty() {
                self.status(ctx, format!("No results for: {}", short));
                continue;
            }

            let extracted = self.extract(ctx, question, &results).await;
            let count = extracted.len();
            let added = ctx.findings.extend(extracted);
            self.status(ctx, format!("Found {} relevant findings", count));
            log::debug!(
                "[{}] {} novos findings ({} no total)",
                ctx.short_id(),
                added,
                ctx.findings.len()
            );
        }

        ctx.iterations = iteration + 1;

        if ctx.iterations >= max {
            log::debug!("[{}] Limite de iterações atingido", ctx.short_id());
            return ResearchState::Synthesizing {
                reason: StopReason::IterationCap,
            };
        }

        self.analyze_gaps(ctx, iteration).await
    }

    /// Busca tolerante: erro vira lista vazia
    async fn search_question(&self, ctx: &mut ResearchContext, question: &str) -> Vec<SearchResult> {
        let timer = ActionTimer::start("search");
        let outcome = self
            .search
            .search(question, self.config.results_per_question)
            .await;
        ctx.timing.add_search_time(timer.stop_and_log());

        match outcome {
            Ok(results) => results,
            Err(e) => {
                self.warn(
                    ctx,
                    format!(
                        "Search failed for \"{}\": {}",
                        preview(question, PREVIEW_CHARS),
                        e
                    ),
                );
                Vec::new()
            }
        }
    }

    /// Extrai findings; erro ou saída ilegível viram lista vazia
    async fn extract(
        &self,
        ctx: &mut ResearchContext,
        question: &str,
        results: &[SearchResult],
    ) -> Vec<Finding> {
        let request = CompletionRequest::new(prompts::extraction_prompt(question, results))
            .with_max_tokens(EXTRACT_MAX_TOKENS);

        match self.complete(ctx, &request, "extraction").await {
            Ok(text) => extract_findings(&text).unwrap_or_else(|| {
                self.warn(
                    ctx,
                    format!(
                        "Extraction output could not be parsed for \"{}\"",
                        preview(question, PREVIEW_CHARS)
                    ),
                );
                Vec::new()
            }),
            Err(e) => {
                self.warn(
                    ctx,
                    format!(
                        "Extraction failed for \"{}\": {}",
                        preview(question, PREVIEW_CHARS),
                        e
                    ),
                );
                Vec::new()
            }
        }
    }

    /// Decide entre nova iteração e síntese
    async fn analyze_gaps(&self, ctx: &mut ResearchContext, iteration: u32) -> ResearchState {
        self.status(ctx, "Analyzing gaps...");

        let request = CompletionRequest::new(prompts::gap_prompt(&ctx.topic, ctx.findings.as_slice()))
            .with_max_tokens(GAPS_MAX_TOKENS);

        let reason = match self.complete(ctx, &request, "gap analysis").await {
            Err(e) => {
                self.warn(ctx, format!("Gap analysis failed ({}), finishing research", e));
                StopReason::GapAnalysisFailed
            }
            Ok(text) => match extract_string_list(&text) {
                None => {
                    self.warn(
                        ctx,
                        "Gap analysis output could not be parsed, treating as no gaps",
                    );
                    StopReason::UnparseableGaps
                }
                Some(gaps) if gaps.is_empty() => {
                    self.status(ctx, "No significant gaps found");
                    StopReason::NoGaps
                }
                Some(gaps) => {
                    let novel = ctx.novel_questions(&gaps);
                    if novel.is_empty() {
                        self.status(ctx, "All suggested gap queries were already searched");
                        StopReason::NoNovelQuestions
                    } else {
                        self.status(
                            ctx,
                            format!("Found {} gaps, generating new queries...", novel.len()),
                        );
                        return ResearchState::Iterating {
                            iteration: iteration + 1,
                            pending: novel,
                        };
                    }
                }
            },
        };

        ResearchState::Synthesizing { reason }
    }

    /// Gera o relatório final; falha ou resposta vazia usam o fallback local
    async fn synthesize(&self, ctx: &mut ResearchContext, reason: StopReason) -> String {
        log::debug!("[{}] Saída do loop: {}", ctx.short_id(), reason.as_str());
        self.status(ctx, "Synthesizing final report...");

        let request = CompletionRequest::new(synthesis_prompt(&ctx.topic, ctx.findings.as_slice()))
            .with_max_tokens(SYNTHESIS_MAX_TOKENS);

        let report = match self.complete(ctx, &request, "synthesis").await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                self.warn(ctx, "Synthesis returned an empty report, using fallback report");
                fallback_report(&ctx.topic, ctx.findings.as_slice())
            }
            Err(e) => {
                self.warn(ctx, format!("Synthesis failed ({}), using fallback report", e));
                fallback_report(&ctx.topic, ctx.findings.as_slice())
            }
        };

        self.status(ctx, "Research complete!");
        report
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // HELPERS
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    async fn complete(
        &self,
        ctx: &mut ResearchContext,
        request: &CompletionRequest,
        phase: &str,
    ) -> Result<String, LlmError> {
        let timer = ActionTimer::start(phase);
        let outcome = self.llm.complete(request).await;
        ctx.timing.add_llm_time(timer.stop_and_log());

        if let Err(e) = &outcome {
            if e.is_rate_limit() {
                log::warn!("[{}] ⏳ LLM rate limited em {}", ctx.short_id(), phase);
            }
        }
        outcome
    }

    fn status(&self, ctx: &mut ResearchContext, message: impl Into<String>) {
        let message = message.into();
        log::info!("[{}] {}", ctx.short_id(), message);
        self.publish(ctx, message);
    }

    fn warn(&self, ctx: &mut ResearchContext, message: impl Into<String>) {
        let message = message.into();
        log::warn!("[{}] ⚠️ {}", ctx.short_id(), message);
        self.publish(ctx, message);
    }

    /// Registra no log da execução e notifica o callback.
    ///
    /// Um panic dentro do callback é contido aqui.
    fn publish(&self, ctx: &mut ResearchContext, message: String) {
        if let Some(callback) = &self.on_status {
            if catch_unwind(AssertUnwindSafe(|| callback(&message))).is_err() {
                log::warn!("[{}] Callback de status falhou, ignorando", ctx.short_id());
            }
        }
        ctx.log.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::search::MockSearchClient;
    use std::sync::Mutex;

    fn agent(llm: MockLlmClient, search: MockSearchClient) -> ResearchAgent {
        ResearchAgent::new(Arc::new(llm), Arc::new(search))
    }

    #[tokio::test]
    async fn test_empty_topic_is_rejected() {
        let agent = agent(MockLlmClient::new(), MockSearchClient::new());
        assert_eq!(
            agent.research("   ").await.unwrap_err(),
            ResearchError::missing_topic()
        );
    }

    #[tokio::test]
    async fn test_planning_failure_falls_back_to_topic() {
        let llm = Arc::new(MockLlmClient::new().fail(LlmError::RateLimited));
        let search = Arc::new(MockSearchClient::new());
        let agent = ResearchAgent::new(llm.clone(), search.clone());

        let result = agent.research("  rust async runtimes ").await.unwrap();

        assert_eq!(search.queries(), vec!["rust async runtimes"]);
        assert_eq!(result.findings_count, 0);
        assert!(!result.report.trim().is_empty());
        assert!(result.log.contains("Generated 1 research questions"));
    }

    #[tokio::test]
    async fn test_status_messages_in_order() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();

        let llm = MockLlmClient::new()
            .respond(r#"["Q1"]"#)
            .respond("[]")
            .respond("# Final");
        let search = MockSearchClient::new();
        let agent = agent(llm, search).with_status_callback(Arc::new(move |m: &str| {
            sink.lock().unwrap().push(m.to_string());
        }));

        let result = agent.research("topic").await.unwrap();
        let seen = seen.lock().unwrap().clone();

        assert_eq!(seen, result.log.as_slice());
        assert_eq!(seen.first().map(String::as_str), Some("Planning research questions..."));
        assert_eq!(seen.last().map(String::as_str), Some("Research complete!"));
        assert!(seen.iter().any(|m| m == "Research iteration 1/3"));
        assert!(seen.iter().any(|m| m == "Searching: Q1"));
        assert!(seen.iter().any(|m| m == "No significant gaps found"));
        assert_eq!(result.report, "# Final");
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_abort() {
        let llm = MockLlmClient::new().respond(r#"["Q1"]"#).respond("[]");
        let agent = agent(llm, MockSearchClient::new())
            .with_status_callback(Arc::new(|_: &str| panic!("ui went away")));

        let result = agent.research("topic").await.unwrap();
        assert!(!result.report.is_empty());
        assert!(result.log.contains("Research complete!"));
    }
}
