//! Invocation of the external compiler.
//!
//! Every call spawns one short-lived process and waits for it to exit,
//! collecting stdout and stderr. The exit code is reported but never
//! interpreted: the compiler exits non-zero whenever it finds errors.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use volta_lsp_core::QueryError;

/// Default bound on a single compiler run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured output of a finished compiler process
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to run {}: {source}", .executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} did not finish within {after:?}", .executable.display())]
    Timeout { executable: PathBuf, after: Duration },
}

impl BridgeError {
    #[cfg(test)]
    pub fn is_spawn(&self) -> bool {
        matches!(self, BridgeError::Spawn { .. })
    }
}

impl From<BridgeError> for QueryError {
    fn from(err: BridgeError) -> Self {
        match &err {
            BridgeError::Spawn { .. } => QueryError::spawn(err.to_string()),
            BridgeError::Timeout { .. } => QueryError::timeout(err.to_string()),
        }
    }
}

/// Runs the compiler. Implemented by [`ProcessRunner`]; tests substitute
/// their own.
#[tower_lsp::async_trait]
pub trait CompilerRunner: Send + Sync {
    async fn invoke(
        &self,
        executable: &Path,
        args: &[OsString],
    ) -> Result<ProcessOutput, BridgeError>;
}

/// Spawns a real OS process per call
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[tower_lsp::async_trait]
impl CompilerRunner for ProcessRunner {
    async fn invoke(
        &self,
        executable: &Path,
        args: &[OsString],
    ) -> Result<ProcessOutput, BridgeError> {
        let mut cmd = Command::new(executable);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(executable = %executable.display(), ?args, "Running compiler");

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(BridgeError::Spawn {
                    executable: executable.to_path_buf(),
                    source,
                })
            }
            // Dropping the future kills the child
            Err(_) => {
                return Err(BridgeError::Timeout {
                    executable: executable.to_path_buf(),
                    after: self.timeout,
                })
            }
        };

        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
