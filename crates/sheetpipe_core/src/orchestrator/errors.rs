//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Job -> Stage -> Operation -> Detail
//!
//! Everything here is caught at job granularity by the batch dispatcher
//! and downgraded to a status in the job's report; only environment
//! errors (see `tools::resolve`) abort the whole invocation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tools::InvokeError;

/// Top-level pipeline error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage failed during execution.
    #[error("Job '{job_name}' failed at stage '{stage_name}': {source}")]
    StageFailed {
        job_name: String,
        stage_name: String,
        #[source]
        source: StepError,
    },

    /// Failed to set up the job (create directories, open log file).
    #[error("Job '{job_name}' setup failed: {message}")]
    SetupFailed { job_name: String, message: String },
}

impl PipelineError {
    /// Create a stage failed error.
    pub fn stage_failed(
        job_name: impl Into<String>,
        stage_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StageFailed {
            job_name: job_name.into(),
            stage_name: stage_name.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }
}

/// Error from a pipeline stage with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// An external stage processor failed (missing binary, spawn
    /// failure, or non-zero exit with the diagnostic tail attached).
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// The stage processor exited cleanly but its expected output is
    /// absent from the search space - the stage silently failed.
    #[error("{what} not found under {search_dir} after the stage exited cleanly")]
    ArtifactMissing { what: String, search_dir: PathBuf },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create an artifact missing error.
    pub fn artifact_missing(what: impl Into<String>, search_dir: impl Into<PathBuf>) -> Self {
        Self::ArtifactMissing {
            what: what.into(),
            search_dir: search_dir.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Exit code of the underlying tool, when one ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            StepError::Invoke(e) => e.exit_code(),
            _ => None,
        }
    }
}

/// Result type for stage operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
