// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SÍNTESE DO RELATÓRIO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Dois caminhos:
// - `synthesis_prompt`: pede ao LLM um relatório Markdown com citações
// - `fallback_report`: formatação local, sem LLM, agrupada por fonte
//
// O fallback nunca devolve string vazia.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::HashSet;

use crate::types::Finding;

/// Tokens para a síntese
pub const SYNTHESIS_MAX_TOKENS: u32 = 4096;

/// Prompt de síntese com todos os findings deduplicados
pub fn synthesis_prompt(topic: &str, findings: &[Finding]) -> String {
    let findings_text = findings
        .iter()
        .map(|f| format!("- {} [Source: {}]({})", f.fact, f.source, f.url))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Write a comprehensive research report on this topic using the provided findings.

Topic: {topic}

Findings:
{findings_text}

Requirements:
1. Write in clear, professional prose (not bullet points for the main content)
2. Organize into logical sections with ## headers
3. Include a brief executive summary at the start
4. Cite sources inline using [Source Name](url) format
5. End with a "Key Takeaways" section (3-5 bullet points)
6. End with a "Sources" section listing all unique sources

Write the report in Markdown format."#
    )
}

/// Grupo de findings de uma mesma fonte
struct SourceGroup<'a> {
    first: &'a Finding,
    facts: Vec<&'a str>,
}

impl SourceGroup<'_> {
    fn url(&self) -> &str {
        &self.first.url
    }

    /// Citação quando há URL; senão o nome da fonte ou `Unattributed`
    fn heading(&self) -> String {
        if !self.first.url.trim().is_empty() {
            return self.first.citation();
        }
        match self.first.source.trim() {
            "" => "Unattributed".to_string(),
            source => source.to_string(),
        }
    }
}

/// Agrupa por (source, url) preservando a ordem da primeira aparição
fn group_by_source(findings: &[Finding]) -> Vec<SourceGroup<'_>> {
    let mut groups: Vec<SourceGroup<'_>> = Vec::new();

    for f in findings {
        match groups
            .iter_mut()
            .find(|g| g.first.source == f.source && g.first.url == f.url)
        {
            Some(group) => group.facts.push(&f.fact),
            None => groups.push(SourceGroup {
                first: f,
                facts: vec![&f.fact],
            }),
        }
    }

    groups
}

/// Relatório local usado quando a síntese via LLM falha.
///
/// Título, resumo com contagens, findings agrupados por fonte e lista final
/// de fontes. Sem findings, explica que nada foi encontrado.
pub fn fallback_report(topic: &str, findings: &[Finding]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Research Report: {}\n\n", topic));
    out.push_str(
        "_This report was assembled directly from the collected findings because the \
         synthesis step was unavailable._\n\n",
    );

    out.push_str("## Executive Summary\n\n");
    if findings.is_empty() {
        out.push_str(&format!(
            "No findings could be collected for \"{}\". The searches returned no usable \
             results, or the extracted data could not be interpreted.\n",
            topic
        ));
        return out;
    }

    let groups = group_by_source(findings);
    let distinct_urls = findings
        .iter()
        .map(|f| f.url.as_str())
        .filter(|u| !u.is_empty())
        .collect::<HashSet<_>>()
        .len();
    out.push_str(&format!(
        "{} findings were collected from {} sources.\n\n",
        findings.len(),
        distinct_urls
    ));

    out.push_str("## Findings by Source\n\n");
    for group in &groups {
        out.push_str(&format!("### {}\n\n", group.heading()));
        for fact in &group.facts {
            out.push_str(&format!("- {}\n", fact));
        }
        out.push('\n');
    }

    out.push_str("## Sources\n\n");
    let mut seen = HashSet::new();
    for group in groups.iter().filter(|g| !g.url().is_empty()) {
        if seen.insert(group.url()) {
            out.push_str(&format!("- {}\n", group.heading()));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_prompt_lists_findings() {
        let findings = vec![
            Finding::new("Fact one", "Source A", "https://a.com"),
            Finding::new("Fact two", "Source B", "https://b.com"),
        ];
        let prompt = synthesis_prompt("AI agents", &findings);

        assert!(prompt.contains("Topic: AI agents"));
        assert!(prompt.contains("- Fact one [Source: Source A](https://a.com)"));
        assert!(prompt.contains("- Fact two [Source: Source B](https://b.com)"));
        assert!(prompt.contains("Key Takeaways"));
    }

    #[test]
    fn test_fallback_groups_by_source_in_order() {
        let findings = vec![
            Finding::new("F1", "Beta", "https://b.com"),
            Finding::new("F2", "Alpha", "https://a.com"),
            Finding::new("F3", "Beta", "https://b.com"),
        ];
        let report = fallback_report("topic", &findings);

        let beta = report.find("### [Beta](https://b.com)").unwrap();
        let alpha = report.find("### [Alpha](https://a.com)").unwrap();
        assert!(beta < alpha);

        let f3 = report.find("- F3").unwrap();
        assert!(f3 > beta && f3 < alpha);
        assert!(report.contains("3 findings were collected from 2 sources"));
        assert!(report.contains("## Sources\n\n- [Beta](https://b.com)\n- [Alpha](https://a.com)\n"));
    }

    #[test]
    fn test_fallback_without_findings_is_not_empty() {
        let report = fallback_report("obscure topic", &[]);
        assert!(!report.trim().is_empty());
        assert!(report.starts_with("# Research Report: obscure topic"));
        assert!(report.contains("No findings"));
    }

    #[test]
    fn test_fallback_headings_without_attribution() {
        let findings = vec![
            Finding::new("Only url", "", "https://x.com"),
            Finding::new("Only source", "Some Blog", ""),
            Finding::new("Nothing", "", ""),
        ];
        let report = fallback_report("t", &findings);
        assert!(report.contains("### [https://x.com](https://x.com)"));
        assert!(report.contains("### Some Blog"));
        assert!(report.contains("### Unattributed"));
    }

    #[test]
    fn test_fallback_headings_match_citations() {
        let findings = vec![
            Finding::new("F1", " Padded Name ", "https://p.com"),
            Finding::new("F2", "", "https://x.com"),
        ];
        let report = fallback_report("t", &findings);
        for f in &findings {
            assert!(report.contains(&format!("### {}\n", f.citation())));
            assert!(report.contains(&format!("- {}\n", f.citation())));
        }
        assert!(report.contains("### [Padded Name](https://p.com)"));
    }
}
