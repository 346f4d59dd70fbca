//! Encode/decode/synthesize pipeline orchestration.

mod runner;
mod tools;

pub use runner::{CodecPipeline, PipelineRun, RunOptions, Stage, StageOutputs, StageTiming};
pub use tools::{run_tool, CapturedOutput, EncodeOptions};

use std::path::PathBuf;

use crate::signal::SignalError;

/// Errors raised while driving the external codec stages.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The external tool could not be started.
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// A stage's process exited with a non-zero status.
    #[error("{stage} stage failed: {tool} exited with code {exit_code}\n{stderr}")]
    StageFailed {
        stage: &'static str,
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    /// A stage reported success but its output file is missing.
    #[error("{stage} stage produced no output at {path}")]
    MissingOutput { stage: &'static str, path: PathBuf },

    /// Reading or writing a pipeline signal failed.
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// Scratch directory or artifact I/O failed.
    #[error("pipeline I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
