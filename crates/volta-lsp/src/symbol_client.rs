//! Symbol queries against the compiler (`--lsp-info` mode).

use std::ffi::OsString;
use std::path::Path;

use volta_lsp_core::{parse_query_output, QueryError, QueryResult};

use crate::bridge::CompilerRunner;

/// Flag selecting symbol-query mode
pub const QUERY_FLAG: &str = "--lsp-info";

/// Ask the compiler about the symbol at `line` (1-indexed) and `column`
/// (0-indexed) of `file`. Failures are returned, never raised.
pub async fn query(
    runner: &dyn CompilerRunner,
    executable: &Path,
    file: &Path,
    line: u32,
    column: u32,
) -> QueryResult {
    let args: Vec<OsString> = vec![
        QUERY_FLAG.into(),
        file.into(),
        line.to_string().into(),
        column.to_string().into(),
    ];

    // stderr belongs to the diagnostics path and is ignored here
    let output = runner
        .invoke(executable, &args)
        .await
        .map_err(QueryError::from)?;
    parse_query_output(&output.stdout)
}
