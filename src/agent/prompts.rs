// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROMPTS DO LOOP DE PESQUISA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Prompts de planejamento, extração e análise de gaps. Todos pedem JSON puro;
// a resposta passa pelo parser tolerante de `utils::json`.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::types::{Finding, SearchResult};
use crate::utils::clean_text;

/// Tokens para o planejamento
pub const PLAN_MAX_TOKENS: u32 = 1024;

/// Tokens para a extração de findings
pub const EXTRACT_MAX_TOKENS: u32 = 1024;

/// Tokens para a análise de gaps
pub const GAPS_MAX_TOKENS: u32 = 512;

/// Quantos findings entram no prompt de gaps
pub const GAP_FINDINGS_LIMIT: usize = 20;

/// Prompt de planejamento (4-6 perguntas)
pub fn plan_prompt(topic: &str) -> String {
    format!(
        r#"Generate 4-6 specific research questions to thoroughly understand this topic:

Topic: {topic}

Requirements:
- Questions should cover different aspects (definition, current state, key players, challenges, future trends)
- Questions should be specific enough to search effectively
- Return ONLY a JSON array of strings, no other text

Example format:
["What is X?", "Who are the main companies in X?", "What are the challenges of X?"]"#
    )
}

/// Prompt de extração de findings a partir dos resultados de uma busca
pub fn extraction_prompt(question: &str, results: &[SearchResult]) -> String {
    let context = results
        .iter()
        .map(|r| {
            format!(
                "Source: {}\nURL: {}\nContent: {}",
                clean_text(&r.title),
                r.url,
                clean_text(&r.content)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Extract key findings from these search results that answer the question.

Question: {question}

Search Results:
{context}

Return a JSON array of findings. Each finding should have:
- "fact": The key information (1-2 sentences)
- "source": The source title
- "url": The source URL

Only include factual, relevant information. Return ONLY valid JSON, no other text.

Example:
[{{"fact": "AI agents market grew 40% in 2024", "source": "TechCrunch", "url": "https://..."}}]"#
    )
}

/// Prompt de análise de gaps (usa só os primeiros findings)
pub fn gap_prompt(topic: &str, findings: &[Finding]) -> String {
    let summary = findings
        .iter()
        .take(GAP_FINDINGS_LIMIT)
        .map(|f| format!("- {}", f.fact))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Given this research topic and current findings, identify any important gaps.

Topic: {topic}

Current Findings:
{summary}

Are there important aspects of this topic that haven't been covered?
If yes, return a JSON array of 2-3 new search queries to fill the gaps.
If the research is comprehensive, return an empty array [].

Return ONLY a JSON array, no other text."#
    )
}
