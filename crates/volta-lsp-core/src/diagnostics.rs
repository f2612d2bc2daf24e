//! Extraction of diagnostics from the compiler's check-mode output.
//!
//! The compiler writes one message per line on stderr:
//!
//! ```text
//! :<line>:<col>[-<col2>]: (error|warning): <message>
//! ```
//!
//! Lines are 1-indexed, columns are taken as-is. Anything that does not
//! match (banners, stack traces, blank lines) is skipped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Source tag attached to every published diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "volta";

static DIAGNOSTIC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":(\d+):(\d+)(?:-(\d+))?: (error|warning): (.*)$")
        .expect("diagnostic line pattern is valid")
});

/// Severity of a compiler message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            _ => None,
        }
    }
}

/// Editor-convention range: 0-indexed lines, columns as reported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

/// A single error or warning reported by the compiler
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerDiagnostic {
    pub severity: Severity,
    pub span: Span,
    pub message: String,
}

/// Parse a block of compiler output into diagnostics, in input order.
pub fn parse_diagnostics(text: &str) -> Vec<CompilerDiagnostic> {
    text.lines().filter_map(parse_line).collect()
}

/// Parse a single line; `None` if it does not follow the grammar.
pub fn parse_line(line: &str) -> Option<CompilerDiagnostic> {
    let caps = DIAGNOSTIC_LINE.captures(line)?;

    let line_no = parse_number(&caps[1]);
    let col = parse_number(&caps[2]);
    let end_col = match caps.get(3) {
        Some(m) => parse_number(m.as_str()),
        None => col.saturating_add(1),
    };
    let severity = Severity::from_tag(&caps[4])?;

    // Lines are 1-indexed in compiler output; columns are not shifted.
    let line_idx = line_no.saturating_sub(1);

    Some(CompilerDiagnostic {
        severity,
        span: Span {
            start_line: line_idx,
            start_col: col,
            end_line: line_idx,
            end_col,
        },
        message: caps[5].trim().to_string(),
    })
}

/// Digits only (the pattern guarantees it); overflow saturates.
fn parse_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}
