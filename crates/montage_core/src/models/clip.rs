//! Clip extraction specs.

use serde::{Deserialize, Serialize};

/// One extraction from the source video.
///
/// `source_start + duration` never exceeds the source duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Offset into the source, seconds.
    pub source_start: f64,
    /// Clip length, seconds.
    pub duration: f64,
    /// Position in the final concatenation (zero-based).
    pub sequence_index: usize,
}

impl ClipSpec {
    /// End offset in the source, seconds.
    pub fn source_end(&self) -> f64 {
        self.source_start + self.duration
    }

    /// Intermediate file name for this clip.
    pub fn file_name(&self) -> String {
        format!("scene_{:03}.mp4", self.sequence_index)
    }
}
