//! Error kinds surfaced by montage planning and rendering.
//!
//! Every failure that can end a job maps onto one `MontageError` variant.
//! The `Display` text of each variant is what ends up in the terminal
//! `error` progress event, so the messages are kept distinct enough to tell
//! "no input" from "tool failed" from "nothing to render".

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while planning or rendering a montage.
#[derive(Error, Debug)]
pub enum MontageError {
    /// Source video, marker file or external audio does not exist.
    #[error("{what} not found: {}", path.display())]
    InputNotFound { what: String, path: PathBuf },

    /// A request option could not be understood.
    #[error("Invalid {option}: {message}")]
    InvalidOption { option: String, message: String },

    /// A required external tool is not installed or not on PATH.
    #[error("Required tool '{tool}' is not available. Ensure it is installed and in PATH")]
    ToolUnavailable { tool: String },

    /// An external invocation returned a non-zero exit status.
    #[error("{operation} failed ({}): {diagnostic}", exit_label(*exit_code))]
    ExternalToolFailure {
        operation: String,
        exit_code: Option<i32>,
        diagnostic: String,
    },

    /// Planning left nothing to render.
    #[error("No video clips were generated: {reason}")]
    EmptyPlan { reason: String },

    /// Local filesystem error.
    #[error("I/O error while {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl MontageError {
    pub fn input_not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    pub fn invalid_option(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            message: message.into(),
        }
    }

    pub fn tool_unavailable(tool: impl Into<String>) -> Self {
        Self::ToolUnavailable { tool: tool.into() }
    }

    pub fn tool_failure(
        operation: impl Into<String>,
        exit_code: Option<i32>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self::ExternalToolFailure {
            operation: operation.into(),
            exit_code,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn empty_plan(reason: impl Into<String>) -> Self {
        Self::EmptyPlan {
            reason: reason.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Stable snake_case tag for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputNotFound { .. } => "input_not_found",
            Self::InvalidOption { .. } => "invalid_option",
            Self::ToolUnavailable { .. } => "tool_unavailable",
            Self::ExternalToolFailure { .. } => "external_tool_failure",
            Self::EmptyPlan { .. } => "empty_plan",
            Self::Io { .. } => "io",
        }
    }
}

/// Result type for montage operations.
pub type MontageResult<T> = Result<T, MontageError>;
