use tower_lsp::lsp_types::*;
use volta_lsp_core::render_hover;

use crate::session::Session;

/// Get hover information for a position in the document
pub async fn get_hover(session: &Session, uri: &Url, position: Position) -> Option<Hover> {
    // The compiler counts lines from 1 and columns from 0
    let result = session
        .query_symbol(uri, position.line.saturating_add(1), position.character)
        .await?;
    let info = result.ok()?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: render_hover(&info),
        }),
        range: None,
    })
}
