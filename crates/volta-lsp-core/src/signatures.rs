//! Textual heuristics behind signature help.
//!
//! Locating the active call and the function it refers to is done on raw
//! text, not on a syntax tree: the first `fn <name>(` line in the document
//! wins, regardless of scope, strings or comments. Parameter names and docs
//! come from the compiler afterwards.

use regex::Regex;

use crate::symbol::SymbolParameter;

/// Keyword introducing a function definition
pub const FUNCTION_KEYWORD: &str = "fn";

/// The call expression enclosing the cursor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Candidate function name (identifier before the open paren)
    pub name: String,
    /// Char index of the unmatched `(` within the line prefix
    pub open_paren: usize,
    /// Number of top-level commas between the paren and the cursor
    pub comma_count: usize,
}

/// Where a function is textually defined (0-indexed line, column of the name)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefinitionSite {
    pub line: u32,
    pub column: u32,
}

/// Find the call the cursor sits in, given the current line up to the cursor.
pub fn find_call_context(line_prefix: &str) -> Option<CallContext> {
    let chars: Vec<char> = line_prefix.chars().collect();

    // Search backwards for the nearest unmatched opening parenthesis
    let mut depth = 0usize;
    let mut paren_pos = None;
    for i in (0..chars.len()).rev() {
        match chars[i] {
            ')' => depth += 1,
            '(' => {
                if depth == 0 {
                    paren_pos = Some(i);
                    break;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    let open_paren = paren_pos?;

    let mut name_end = open_paren;
    while name_end > 0 && chars[name_end - 1].is_whitespace() {
        name_end -= 1;
    }

    let mut name_start = name_end;
    while name_start > 0 && is_identifier_char(chars[name_start - 1]) {
        name_start -= 1;
    }

    // Identifiers cannot start with a digit
    while name_start < name_end && chars[name_start].is_ascii_digit() {
        name_start += 1;
    }

    if name_start >= name_end {
        return None;
    }

    Some(CallContext {
        name: chars[name_start..name_end].iter().collect(),
        open_paren,
        comma_count: count_commas(&chars[open_paren + 1..]),
    })
}

/// Count argument separators, skipping nested brackets and string literals.
fn count_commas(args: &[char]) -> usize {
    let mut count = 0;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for &ch in args {
        if escape_next {
            escape_next = false;
            continue;
        }
        if ch == '\\' && in_string {
            escape_next = true;
            continue;
        }

        match ch {
            '"' => in_string = !in_string,
            '(' | '[' | '{' if !in_string => depth += 1,
            ')' | ']' | '}' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => count += 1,
            _ => {}
        }
    }

    count
}

/// Find the first line of `text` that looks like `fn <name>(`.
pub fn find_function_definition(text: &str, name: &str) -> Option<DefinitionSite> {
    let pattern = format!(
        r"\b{}\s+({})\s*\(",
        FUNCTION_KEYWORD,
        regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;

    text.lines().enumerate().find_map(|(idx, line)| {
        let caps = re.captures(line)?;
        let name_match = caps.get(1)?;
        let column = line[..name_match.start()].chars().count();
        Some(DefinitionSite {
            line: idx as u32,
            column: column as u32,
        })
    })
}

/// `name(a, b, c)` from the parameter names
pub fn signature_label(name: &str, parameters: &[SymbolParameter]) -> String {
    let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
    format!("{}({})", name, names.join(", "))
}

/// Clamp the comma count to a valid parameter index.
pub fn active_parameter(comma_count: usize, parameter_count: usize) -> usize {
    comma_count.min(parameter_count.saturating_sub(1))
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
