//! Progress events reported for a job.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::JobStatus;

/// A single status update for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: JobStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
}

impl ProgressEvent {
    pub fn new(status: JobStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            output_file: None,
        }
    }

    pub fn queued(message: impl Into<String>) -> Self {
        Self::new(JobStatus::Queued, message)
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(JobStatus::Processing, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(JobStatus::Error, message)
    }

    pub fn completed(message: impl Into<String>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            status: JobStatus::Completed,
            message: message.into(),
            output_file: Some(output_file.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_carries_output() {
        let event = ProgressEvent::completed("done", "/out/montage.mp4");
        assert!(event.is_terminal());
        assert_eq!(event.output_file, Some(PathBuf::from("/out/montage.mp4")));
    }

    #[test]
    fn serializes_without_missing_output() {
        let json = serde_json::to_string(&ProgressEvent::processing("Parsing labels")).unwrap();
        assert!(json.contains("\"status\":\"processing\""));
        assert!(!json.contains("output_file"));
    }
}
