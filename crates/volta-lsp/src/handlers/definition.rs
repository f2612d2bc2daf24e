use tower_lsp::lsp_types::*;

use crate::session::Session;

/// Get the definition location for a symbol at the given position.
///
/// Uses the declaration site reported by the compiler. When the compiler
/// reports none, the cursor position itself is returned.
pub async fn get_definition(
    session: &Session,
    uri: &Url,
    position: Position,
) -> Option<GotoDefinitionResponse> {
    let result = session
        .query_symbol(uri, position.line.saturating_add(1), position.character)
        .await?;
    let info = result.ok()?;

    let location = match &info.location {
        Some(site) => {
            let target = match site.file.as_deref() {
                Some(file) => Url::from_file_path(file).unwrap_or_else(|_| uri.clone()),
                None => uri.clone(),
            };
            let line = site.line.saturating_sub(1);
            Location {
                uri: target,
                range: Range {
                    start: Position {
                        line,
                        character: site.column,
                    },
                    end: Position {
                        line,
                        character: site
                            .column
                            .saturating_add(info.name.chars().count() as u32),
                    },
                },
            }
        }
        None => {
            tracing::debug!(name = %info.name, "No declaration site reported, using cursor");
            Location {
                uri: uri.clone(),
                range: Range {
                    start: position,
                    end: position,
                },
            }
        }
    };

    Some(GotoDefinitionResponse::Scalar(location))
}
