//! Core enums used throughout the montage pipeline.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MontageError;

/// How an external audio track is combined with the montage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMixMode {
    /// Drop the clips' own audio and use the external track.
    #[default]
    Replace,
    /// Blend the clips' audio with the external track.
    Mix,
}

impl AudioMixMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Mix => "mix",
        }
    }
}

impl std::fmt::Display for AudioMixMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioMixMode {
    type Err = MontageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "mix" => Ok(Self::Mix),
            other => Err(MontageError::invalid_option(
                "audio mode",
                format!("'{}'. Must be 'replace' or 'mix'", other),
            )),
        }
    }
}

/// Lifecycle status of a render job.
///
/// `Completed` and `Error` are terminal; once a job reaches either it
/// never changes status again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    /// Whether this status ends the job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_mode_parses_case_insensitively() {
        assert_eq!("MIX".parse::<AudioMixMode>().unwrap(), AudioMixMode::Mix);
        assert_eq!(" replace ".parse::<AudioMixMode>().unwrap(), AudioMixMode::Replace);
    }

    #[test]
    fn audio_mode_rejects_unknown() {
        let err = "overlay".parse::<AudioMixMode>().unwrap_err();
        assert_eq!(err.kind(), "invalid_option");
        assert!(err.to_string().contains("overlay"));
    }

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
