//! Keyword completion data for the Volta language

use once_cell::sync::Lazy;

/// A keyword completion shared by every document
#[derive(Clone, Debug)]
pub struct CompletionEntry {
    pub label: &'static str,
    pub detail: &'static str,
}

/// All keyword completions, built once
pub static KEYWORD_COMPLETIONS: Lazy<Vec<CompletionEntry>> = Lazy::new(build_keyword_completions);

/// Get all keyword completions
pub fn get_keyword_completions() -> &'static [CompletionEntry] {
    &KEYWORD_COMPLETIONS
}

fn build_keyword_completions() -> Vec<CompletionEntry> {
    [
        ("fn", "Define a function"),
        ("let", "Declare an immutable binding"),
        ("mut", "Declare a mutable binding"),
        ("const", "Declare a compile-time constant"),
        ("if", "Conditional branch"),
        ("else", "Alternative branch of a conditional"),
        ("while", "Loop while a condition holds"),
        ("for", "Iterate over a collection"),
        ("in", "Iteration source in a for loop"),
        ("return", "Return from the enclosing function"),
        ("break", "Exit the enclosing loop"),
        ("continue", "Skip to the next loop iteration"),
        ("struct", "Define a struct type"),
        ("type", "Define a type alias"),
        ("import", "Import a module"),
        ("true", "Boolean literal true"),
        ("false", "Boolean literal false"),
        ("nil", "The absent value"),
        ("and", "Logical conjunction"),
        ("or", "Logical disjunction"),
        ("not", "Logical negation"),
    ]
    .into_iter()
    .map(|(label, detail)| CompletionEntry { label, detail })
    .collect()
}
