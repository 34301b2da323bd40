// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEXT UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Truncation para logs e limpeza de trechos antes de entrarem em prompts.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tamanho padrão de preview de perguntas no log
pub const PREVIEW_CHARS: usize = 50;

/// Trunca texto para no máximo `max_chars` caracteres (não bytes)
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Preview para logs: trunca e marca com `...` quando cortado
pub fn preview(text: &str, max_chars: usize) -> String {
    let cut = truncate_chars(text, max_chars);
    if cut.len() < text.len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}

/// Remove caracteres de controle e normaliza whitespace
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_utf8() {
        assert_eq!(truncate_chars("pesquisa ação", 11), "pesquisa aç");
        assert_eq!(truncate_chars("curto", 50), "curto");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("What is quantum computing?", 7), "What is...");
        assert_eq!(preview("Short", PREVIEW_CHARS), "Short");
    }

    #[test]
    fn test_clean_text() {
        let text = "Hello\x00   world\t\ntest";
        assert_eq!(clean_text(text), "Hello world test");
    }
}
