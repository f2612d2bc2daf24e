use tower_lsp::lsp_types::*;
use volta_lsp_core::{active_parameter, find_call_context, find_function_definition, signature_label};

use crate::session::Session;

/// Get signature help for a position in the document.
///
/// The enclosing call and its definition are found textually; parameter
/// names and documentation then come from a symbol query at the definition.
pub async fn get_signature_help(
    session: &Session,
    uri: &Url,
    position: Position,
) -> Option<SignatureHelp> {
    let doc = session.document(uri)?;
    let line_prefix = doc.line_prefix(position.line, position.character)?;

    let call = find_call_context(&line_prefix)?;
    let site = find_function_definition(doc.text(), &call.name)?;

    let info = session
        .query_symbol(uri, site.line + 1, site.column)
        .await?
        .ok()?;
    let params = info.parameters();

    let parameters: Vec<ParameterInformation> = params
        .iter()
        .map(|p| ParameterInformation {
            label: ParameterLabel::Simple(p.name.clone()),
            documentation: p.documentation.clone().map(Documentation::String),
        })
        .collect();

    let active = active_parameter(call.comma_count, params.len()) as u32;

    let signature_info = SignatureInformation {
        label: signature_label(&call.name, params),
        documentation: info.documentation.as_ref().map(|doc| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: doc.clone(),
            })
        }),
        parameters: Some(parameters),
        active_parameter: Some(active),
    };

    Some(SignatureHelp {
        signatures: vec![signature_info],
        active_signature: Some(0),
        active_parameter: Some(active),
    })
}
