use tower_lsp::lsp_types::*;
use volta_lsp_core::{CompilerDiagnostic, Severity, DIAGNOSTIC_SOURCE};

/// Convert compiler diagnostics to LSP diagnostics, keeping at most `max`
pub fn to_lsp_diagnostics(diagnostics: &[CompilerDiagnostic], max: usize) -> Vec<Diagnostic> {
    diagnostics.iter().take(max).map(to_lsp_diagnostic).collect()
}

fn to_lsp_diagnostic(diag: &CompilerDiagnostic) -> Diagnostic {
    let severity = match diag.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
    };

    Diagnostic {
        range: Range {
            start: Position {
                line: diag.span.start_line,
                character: diag.span.start_col,
            },
            end: Position {
                line: diag.span.end_line,
                character: diag.span.end_col,
            },
        },
        severity: Some(severity),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}
