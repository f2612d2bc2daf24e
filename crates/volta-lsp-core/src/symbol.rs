//! Symbol records returned by the compiler's `--lsp-info` query mode.
//!
//! The compiler prints exactly one JSON document on stdout:
//!
//! ```json
//! { "success": true,  "result": { "kind": "function", "name": "add", ... } }
//! { "success": false, "error":  { "code": "SymbolNotFound", "message": "..." } }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure code for stdout that is not a valid envelope
pub const PARSE_ERROR: &str = "ParseError";
/// Failure code for a compiler that could not be started
pub const SPAWN_ERROR: &str = "SpawnError";
/// Failure code for a compiler that did not finish in time
pub const TIMEOUT_ERROR: &str = "TimeoutError";
/// Failure code the compiler uses when nothing is at the position
pub const SYMBOL_NOT_FOUND: &str = "SymbolNotFound";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    #[serde(alias = "Function")]
    Function,
    #[serde(alias = "Variable")]
    Variable,
    #[serde(alias = "Struct")]
    Struct,
    #[serde(alias = "Type")]
    Type,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Variable => "variable",
            SymbolKind::Struct => "struct",
            SymbolKind::Type => "type",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Declaration site reported by the compiler (1-indexed line, 0-indexed column)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<SymbolParameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl SymbolInfo {
    pub fn parameters(&self) -> &[SymbolParameter] {
        self.parameters.as_deref().unwrap_or_default()
    }
}

/// Failure branch of a symbol query
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct QueryError {
    pub code: String,
    pub message: String,
}

impl QueryError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR, message)
    }

    pub fn spawn(message: impl Into<String>) -> Self {
        Self::new(SPAWN_ERROR, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TIMEOUT_ERROR, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == SYMBOL_NOT_FOUND
    }
}

/// Outcome of one symbol query against the compiler
pub type QueryResult = Result<SymbolInfo, QueryError>;

#[derive(Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    result: Option<SymbolInfo>,
    #[serde(default)]
    error: Option<QueryError>,
}

/// Decode the compiler's stdout into a query result. Never fails: malformed
/// output becomes a `ParseError` failure.
pub fn parse_query_output(stdout: &str) -> QueryResult {
    let envelope: Envelope = serde_json::from_str(stdout.trim())
        .map_err(|e| QueryError::parse(format!("invalid symbol query output: {}", e)))?;

    match envelope {
        Envelope {
            success: true,
            result: Some(info),
            ..
        } => Ok(info),
        Envelope { success: true, .. } => Err(QueryError::parse(
            "successful symbol query without a result",
        )),
        Envelope {
            success: false,
            error: Some(error),
            ..
        } => Err(error),
        Envelope { success: false, .. } => Err(QueryError::parse(
            "failed symbol query without an error",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_result() {
        let out = r#"{
            "success": true,
            "result": {
                "kind": "function",
                "name": "add",
                "type": "fn(int, int) -> int",
                "signature": "fn add(a: int, b: int) -> int",
                "documentation": "Adds two numbers.",
                "parameters": [
                    {"name": "a", "documentation": "left operand"},
                    {"name": "b"}
                ],
                "returnDoc": "the sum",
                "location": {"line": 3, "column": 3}
            }
        }"#;

        let info = parse_query_output(out).unwrap();
        assert_eq!(info.kind, SymbolKind::Function);
        assert_eq!(info.name, "add");
        assert_eq!(info.type_name, "fn(int, int) -> int");
        assert_eq!(info.parameters().len(), 2);
        assert_eq!(info.parameters()[1].documentation, None);
        assert_eq!(info.return_doc.as_deref(), Some("the sum"));
        assert_eq!(
            info.location,
            Some(SourceLocation {
                file: None,
                line: 3,
                column: 3
            })
        );
    }

    #[test]
    fn test_capitalised_kind_is_accepted() {
        let out = r#"{"success": true, "result": {"kind": "Struct", "name": "Point", "type": "struct", "signature": "struct Point"}}"#;
        let info = parse_query_output(out).unwrap();
        assert_eq!(info.kind, SymbolKind::Struct);
        assert!(info.parameters().is_empty());
    }

    #[test]
    fn test_failure_envelope_is_passed_through() {
        let out = r#"{"success": false, "error": {"code": "SymbolNotFound", "message": "no symbol at 4:2"}}"#;
        let err = parse_query_output(out).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, "no symbol at 4:2");
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_query_output("{\"success\": tru").unwrap_err();
        assert_eq!(err.code, PARSE_ERROR);
    }

    #[test]
    fn test_empty_output_is_parse_error() {
        let err = parse_query_output("").unwrap_err();
        assert_eq!(err.code, PARSE_ERROR);
    }

    #[test]
    fn test_success_without_result_is_parse_error() {
        let err = parse_query_output(r#"{"success": true}"#).unwrap_err();
        assert_eq!(err.code, PARSE_ERROR);
    }

    #[test]
    fn test_query_error_display() {
        let err = QueryError::spawn("No such file or directory");
        assert_eq!(err.to_string(), "SpawnError: No such file or directory");
    }
}
