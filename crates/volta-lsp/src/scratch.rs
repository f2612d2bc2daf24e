//! Scratch files holding unsaved editor content for the compiler to read.
//!
//! The file is removed when the [`ScratchFile`] is dropped.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;

const SCRATCH_PREFIX: &str = "volta-lsp-";
const SCRATCH_SUFFIX: &str = ".volta";

#[derive(Debug, Error)]
#[error("failed to prepare scratch file: {0}")]
pub struct ScratchError(#[from] std::io::Error);

pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Create a uniquely named file in the system temp directory holding `text`.
    pub fn create(text: &str) -> Result<Self, ScratchError> {
        let mut file = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(SCRATCH_SUFFIX)
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
