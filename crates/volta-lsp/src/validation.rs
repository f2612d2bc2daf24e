//! Check-mode runs of the compiler (`--no-execute`).

use std::ffi::OsString;
use std::path::Path;

use volta_lsp_core::{parse_diagnostics, CompilerDiagnostic};

use crate::bridge::{BridgeError, CompilerRunner};

/// Flag selecting check mode
pub const CHECK_FLAG: &str = "--no-execute";

/// Check `file` and return the diagnostics found on stderr.
pub async fn check(
    runner: &dyn CompilerRunner,
    executable: &Path,
    file: &Path,
) -> Result<Vec<CompilerDiagnostic>, BridgeError> {
    let args: Vec<OsString> = vec![CHECK_FLAG.into(), file.into()];
    let output = runner.invoke(executable, &args).await?;

    tracing::trace!(exit_code = ?output.exit_code, "Check finished");

    Ok(parse_diagnostics(&output.stderr))
}
