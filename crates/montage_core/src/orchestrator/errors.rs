//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Job → Step → `MontageError`

use thiserror::Error;

use crate::error::{MontageError, MontageResult};

/// Top-level pipeline error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during validation or execution.
    #[error("Job '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: MontageError,
    },

    /// The job could not be set up (options, work area, logger).
    #[error("Job '{job_name}' setup failed: {source}")]
    SetupFailed {
        job_name: String,
        #[source]
        source: MontageError,
    },
}

impl PipelineError {
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: MontageError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    pub fn setup_failed(job_name: impl Into<String>, source: MontageError) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            source,
        }
    }

    /// The underlying montage error.
    pub fn root(&self) -> &MontageError {
        match self {
            Self::StepFailed { source, .. } | Self::SetupFailed { source, .. } => source,
        }
    }

    /// Name of the failing step, `None` for setup failures.
    pub fn step_name(&self) -> Option<&str> {
        match self {
            Self::StepFailed { step_name, .. } => Some(step_name),
            Self::SetupFailed { .. } => None,
        }
    }

    pub fn into_root(self) -> MontageError {
        match self {
            Self::StepFailed { source, .. } | Self::SetupFailed { source, .. } => source,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = MontageResult<T>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_chains_context() {
        let err = PipelineError::step_failed(
            "3f2a",
            "Extract",
            MontageError::tool_failure("extracting scene 2", Some(1), "Invalid data"),
        );

        let msg = err.to_string();
        assert!(msg.contains("3f2a"));
        assert!(msg.contains("Extract"));
        assert!(msg.contains("extracting scene 2"));
        assert_eq!(err.step_name(), Some("Extract"));
        assert_eq!(err.root().kind(), "external_tool_failure");
    }

    #[test]
    fn setup_failure_exposes_root() {
        let err = PipelineError::setup_failed(
            "job",
            MontageError::invalid_option("output resolution", "'big'"),
        );
        assert_eq!(err.step_name(), None);
        assert_eq!(err.into_root().kind(), "invalid_option");
    }
}
