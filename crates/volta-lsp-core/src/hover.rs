//! Markdown rendering of symbol information for hover popups.

use crate::symbol::SymbolInfo;

/// Language tag used for fenced code blocks
pub const CODE_FENCE_LANGUAGE: &str = "volta";

/// Render a symbol as a markdown hover block.
pub fn render_hover(info: &SymbolInfo) -> String {
    let mut sections = Vec::new();

    sections.push(format!(
        "**{}** `{}`: `{}`",
        info.kind.as_str(),
        info.name,
        info.type_name
    ));

    if !info.signature.is_empty() {
        sections.push(format!(
            "```{}\n{}\n```",
            CODE_FENCE_LANGUAGE, info.signature
        ));
    }

    if let Some(doc) = info.documentation.as_deref().filter(|d| !d.trim().is_empty()) {
        sections.push(doc.trim().to_string());
    }

    let documented: Vec<String> = info
        .parameters()
        .iter()
        .filter_map(|p| {
            let doc = p.documentation.as_deref()?.trim();
            (!doc.is_empty()).then(|| format!("- `{}`: {}", p.name, doc))
        })
        .collect();
    if !documented.is_empty() {
        sections.push(format!("**Parameters:**\n{}", documented.join("\n")));
    }

    if let Some(ret) = info.return_doc.as_deref().filter(|r| !r.trim().is_empty()) {
        sections.push(format!("**Returns:** {}", ret.trim()));
    }

    sections.join("\n\n")
}
