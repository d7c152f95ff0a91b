//! Typed errors for the tac pipeline.
//!
//! `PipelineError` covers the two fatal outcomes the runner distinguishes
//! (a missing required command file and a failed stage invocation) plus a
//! transparent wrapper for environmental failures. `exit_code` maps each
//! variant to the process status the binary reports.

use std::path::PathBuf;
use thiserror::Error;

use crate::stage::Stage;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required stage's command file does not exist.
    #[error("Missing {path}. Aborting.")]
    MissingCommand { stage: Stage, path: PathBuf },

    /// A stage invocation returned a non-zero exit code.
    #[error("{stage} command exited with code {code}")]
    StageFailed { stage: Stage, code: i32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Process exit status for this error.
    ///
    /// Missing command files report 2; failed stages propagate their exact
    /// exit code; everything else reports 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::MissingCommand { .. } => 2,
            PipelineError::StageFailed { code, .. } => *code,
            PipelineError::Other(_) => 1,
        }
    }
}
