//! Data models for the montage pipeline.
//!
//! - Enums for audio mixing and job status
//! - Resolved montage options
//! - Clip extraction specs
//! - Progress events

mod clip;
mod enums;
mod options;
mod progress;

pub use clip::ClipSpec;
pub use enums::{AudioMixMode, JobStatus};
pub use options::{MontageOptions, Resolution};
pub use progress::ProgressEvent;
