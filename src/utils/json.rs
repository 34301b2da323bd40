// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// STRUCTURED OUTPUT PARSER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Extração tolerante de JSON embutido em texto livre de LLM:
// - Conteúdo de blocos ``` (com ou sem tag de linguagem) tem prioridade
// - Depois, o texto inteiro
// - Por fim, o primeiro trecho balanceado {...} ou [...]
//
// Nunca retorna erro: ausência de JSON válido vira `None`.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::types::Finding;

/// Blocos cercados por ```, com tag de linguagem opcional
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").expect("fenced block regex is valid")
});

/// Extrai o primeiro valor JSON bem formado de um texto livre.
///
/// Retorna `None` quando nada válido é encontrado.
pub fn extract_json(text: &str) -> Option<Value> {
    for captures in FENCED_BLOCK.captures_iter(text) {
        if let Some(inner) = captures.get(1) {
            let inner = inner.as_str().trim();
            if let Ok(value) = serde_json::from_str::<Value>(inner) {
                return Some(value);
            }
            if let Some(value) = scan_balanced(inner) {
                return Some(value);
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    scan_balanced(trimmed)
}

/// Procura o primeiro trecho `{...}` ou `[...]` balanceado que seja JSON válido.
///
/// Um abridor que nunca fecha só encerra a busca quando o resto do texto é um
/// valor JSON cortado no meio (erro de EOF). Colchete solto em prosa é pulado.
fn scan_balanced(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(offset) = bytes[start..].iter().position(|b| *b == b'{' || *b == b'[') {
        let open = start + offset;
        match matching_close(bytes, open) {
            Span::Closed(close) => {
                if let Ok(value) = serde_json::from_str::<Value>(&text[open..=close]) {
                    return Some(value);
                }
                start = close + 1;
            }
            Span::Mismatched => start = open + 1,
            Span::Unclosed => {
                if is_truncated_value(&text[open..]) {
                    return None;
                }
                start = open + 1;
            }
        }
    }

    None
}

/// `true` quando o texto começa com um valor JSON interrompido pelo fim da entrada
fn is_truncated_value(tail: &str) -> bool {
    matches!(serde_json::from_str::<Value>(tail), Err(e) if e.is_eof())
}

/// Resultado da busca pelo delimitador de fechamento
enum Span {
    Closed(usize),
    Mismatched,
    Unclosed,
}

/// Procura o delimitador que fecha o abridor em `open`, respeitando strings.
fn matching_close(bytes: &[u8], open: usize) -> Span {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return Span::Mismatched;
                }
                if stack.is_empty() {
                    return Span::Closed(i);
                }
            }
            _ => {}
        }
    }

    Span::Unclosed
}

/// Extrai uma lista de strings (perguntas) do texto.
///
/// Itens que não são string ou ficam vazios após `trim` são descartados, e
/// repetições exatas colapsam na primeira ocorrência. `None` quando o texto
/// não contém um array JSON.
pub fn extract_string_list(text: &str) -> Option<Vec<String>> {
    let items = match extract_json(text)? {
        Value::Array(items) => items,
        _ => return None,
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(s) = item.as_str().map(str::trim).filter(|s| !s.is_empty()) {
            if !out.iter().any(|existing| existing == s) {
                out.push(s.to_string());
            }
        }
    }
    Some(out)
}

/// Extrai findings `{fact, source, url}` do texto.
///
/// O `fact` sai sem espaços nas pontas; itens malformados ou com `fact`
/// vazio são ignorados individualmente. `None` quando o texto não contém um array JSON.
pub fn extract_findings(text: &str) -> Option<Vec<Finding>> {
    let items = match extract_json(text)? {
        Value::Array(items) => items,
        _ => return None,
    };

    Some(
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Finding>(item).ok())
            .map(|mut f| {
                f.fact = f.fact.trim().to_string();
                f
            })
            .filter(|f| !f.fact.is_empty())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_array() {
        assert_eq!(
            extract_json(r#"["What is X?", "Who makes X?"]"#),
            Some(json!(["What is X?", "Who makes X?"]))
        );
    }

    #[test]
    fn test_fenced_block_with_language_tag() {
        let text = "Here you go:\n```json\n[\"a\", \"b\"]\n```\nHope this helps.";
        assert_eq!(extract_json(text), Some(json!(["a", "b"])));
    }

    #[test]
    fn test_fenced_block_without_language_tag() {
        let text = "```\n{\"k\": 1}\n```";
        assert_eq!(extract_json(text), Some(json!({"k": 1})));
    }

    #[test]
    fn test_fenced_block_preferred_over_prose_brackets() {
        let text = "Note [1] above.\n```json\n[\"inside\"]\n```";
        assert_eq!(extract_json(text), Some(json!(["inside"])));
    }

    #[test]
    fn test_balanced_span_in_prose() {
        let text = "Sure! The questions are [\"Q1\", \"Q2\"] and that's all.";
        assert_eq!(extract_json(text), Some(json!(["Q1", "Q2"])));
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        let text = r#"Result: {"fact": "uses [brackets] and {braces}", "url": "x"} done"#;
        let value = extract_json(text).unwrap();
        assert_eq!(value["fact"], "uses [brackets] and {braces}");
    }

    #[test]
    fn test_invalid_span_skipped_for_later_valid_one() {
        let text = "See [the docs] for details: {\"ok\": true}";
        assert_eq!(extract_json(text), Some(json!({"ok": true})));
    }

    #[test]
    fn test_mismatched_delimiters_skipped() {
        let text = "Oops [a} then [\"x\"]";
        assert_eq!(extract_json(text), Some(json!(["x"])));
    }

    #[test]
    fn test_stray_unclosed_opener_skipped() {
        let text = "Questions (see [note below):\n[\"Q1\", \"Q2\"]";
        assert_eq!(extract_json(text), Some(json!(["Q1", "Q2"])));

        let text = "Format {fact, source, url:\n[\"Q1\"]";
        assert_eq!(extract_json(text), Some(json!(["Q1"])));
    }

    #[test]
    fn test_truncated_array_in_prose_is_none() {
        let text = "Findings: [{\"fact\": \"a\", \"url\": \"u\"}, {\"fact\": \"b\"";
        assert_eq!(extract_json(text), None);
    }

    #[test]
    fn test_truncated_fenced_block_is_none() {
        let text = "```json\n[{\"fact\": \"a\", \"source\": \"s\", \"url\": \"u\"}, {\"fact\": \"b\"";
        assert_eq!(extract_json(text), None);
    }

    #[test]
    fn test_no_json_is_none() {
        assert_eq!(extract_json("Here are some great questions to research..."), None);
        assert_eq!(extract_json(""), None);
        assert_eq!(extract_json("   \n  "), None);
    }

    #[test]
    fn test_extract_string_list_filters_and_dedups() {
        let list = extract_string_list(r#"["  Q1 ", "", 42, "Q2", "Q1"]"#).unwrap();
        assert_eq!(list, vec!["Q1", "Q2"]);

        assert_eq!(extract_string_list("[]"), Some(vec![]));
        assert_eq!(extract_string_list(r#"{"questions": []}"#), None);
        assert_eq!(extract_string_list("nothing here"), None);
    }

    #[test]
    fn test_extract_findings_skips_bad_items() {
        let text = r#"```json
[
  {"fact": "AI agents market grew 40% in 2024", "source": "TechCrunch", "url": "https://tc.com"},
  {"source": "missing fact"},
  {"fact": "   "},
  {"fact": "No source given"}
]
```"#;
        let findings = extract_findings(text).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].source, "TechCrunch");
        assert_eq!(findings[1].fact, "No source given");
        assert!(findings[1].url.is_empty());
    }

    #[test]
    fn test_extract_findings_not_array() {
        assert_eq!(extract_findings(r#"{"fact": "x"}"#), None);
        assert_eq!(extract_findings("I couldn't parse the results properly."), None);
    }
}
