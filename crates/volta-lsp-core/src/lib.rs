//! Core language-server logic for Volta
//!
//! Everything here is synchronous and protocol-agnostic so it can be shared
//! by the language server and exercised directly in tests.
//!
//! # Features
//!
//! - **Diagnostics**: extraction of errors and warnings from check-mode output
//! - **Symbols**: the JSON envelope produced by symbol queries
//! - **Signatures**: locating the enclosing call and its textual definition
//! - **Hover**: markdown rendering of symbol information
//! - **Completion**: keyword completion data
//!
//! # Example
//!
//! ```
//! use volta_lsp_core::{parse_diagnostics, Severity};
//!
//! let diags = parse_diagnostics(":3:5-7: error: Type mismatch");
//! assert_eq!(diags[0].severity, Severity::Error);
//! assert_eq!(diags[0].span.start_line, 2);
//! ```

pub mod completion;
pub mod diagnostics;
pub mod hover;
pub mod signatures;
pub mod symbol;

// Re-export main types for convenience
pub use completion::{get_keyword_completions, CompletionEntry};
pub use diagnostics::{parse_diagnostics, CompilerDiagnostic, Severity, Span, DIAGNOSTIC_SOURCE};
pub use hover::render_hover;
pub use signatures::{
    active_parameter, find_call_context, find_function_definition, signature_label, CallContext,
    DefinitionSite,
};
pub use symbol::{
    parse_query_output, QueryError, QueryResult, SourceLocation, SymbolInfo, SymbolKind,
    SymbolParameter,
};
