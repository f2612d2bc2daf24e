use tower_lsp::lsp_types::*;

/// Define the server capabilities for the Volta LSP
pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        // Full text sync: every change carries the whole document
        text_document_sync: Some(TextDocumentSyncCapability::Kind(
            TextDocumentSyncKind::FULL,
        )),

        // Hover information (type, signature, docs from the compiler)
        hover_provider: Some(HoverProviderCapability::Simple(true)),

        // Go to definition
        definition_provider: Some(OneOf::Left(true)),

        // Keyword completion
        completion_provider: Some(CompletionOptions::default()),

        // Signature help (function parameter hints)
        signature_help_provider: Some(SignatureHelpOptions {
            trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
            retrigger_characters: Some(vec![",".to_string()]),
            work_done_progress_options: Default::default(),
        }),

        // Diagnostics are pushed via publishDiagnostics (no special capability needed)

        ..Default::default()
    }
}
