use once_cell::sync::Lazy;
use tower_lsp::lsp_types::*;
use volta_lsp_core::{get_keyword_completions, CompletionEntry};

use crate::document::Document;

/// Cached LSP completion items converted from core keyword entries
static KEYWORD_COMPLETIONS: Lazy<Vec<CompletionItem>> = Lazy::new(|| {
    get_keyword_completions()
        .iter()
        .map(convert_to_lsp_completion)
        .collect()
});

fn convert_to_lsp_completion(entry: &CompletionEntry) -> CompletionItem {
    CompletionItem {
        label: entry.label.to_string(),
        kind: Some(CompletionItemKind::KEYWORD),
        detail: Some(entry.detail.to_string()),
        insert_text: Some(entry.label.to_string()),
        insert_text_format: Some(InsertTextFormat::PLAIN_TEXT),
        ..Default::default()
    }
}

/// Get completion items for a position in the document
pub fn get_completions(doc: &Document, position: Position) -> Vec<CompletionItem> {
    let before_cursor = doc
        .line_prefix(position.line, position.character)
        .unwrap_or_default();

    // The user is naming a new binding; keywords would only get in the way
    if let Some(last_word) = before_cursor.trim_end().split_whitespace().last() {
        if matches!(last_word, "let" | "mut" | "const" | "fn" | "struct" | "type") {
            return vec![];
        }
    }

    KEYWORD_COMPLETIONS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(line: u32, character: u32) -> Position {
        Position { line, character }
    }

    #[test]
    fn test_keywords_offered() {
        let doc = Document::new("wh".to_string(), 0);
        let items = get_completions(&doc, position(0, 2));
        assert_eq!(items.len(), get_keyword_completions().len());
        assert!(items.iter().all(|i| i.kind == Some(CompletionItemKind::KEYWORD)));
        assert!(items.iter().any(|i| i.label == "while"));
    }

    #[test]
    fn test_no_completions_when_naming_binding() {
        let doc = Document::new("let ".to_string(), 0);
        assert!(get_completions(&doc, position(0, 4)).is_empty());

        let doc = Document::new("fn ".to_string(), 0);
        assert!(get_completions(&doc, position(0, 3)).is_empty());
    }

    #[test]
    fn test_position_past_end_of_document() {
        let doc = Document::new(String::new(), 0);
        assert!(!get_completions(&doc, position(3, 0)).is_empty());
    }
}
