//! Requests, jobs and the submission boundary.
//!
//! This module provides:
//! - `MontageRequest` / `SourceRef`: what a caller asks for
//! - `RenderJob`: a request with options resolved and an id assigned
//! - `ProgressSink` / `JobStore`: progress events keyed by job id
//! - `MontageService`: starts jobs and answers status lookups
//! - `acquire`: library lookup and URL download of source videos

mod acquire;
mod service;
mod store;
mod types;

pub use acquire::{
    download_args, download_video, has_extension, list_library_videos, resolve_library_video,
    AUDIO_EXTENSIONS, MARKER_EXTENSIONS, VIDEO_EXTENSIONS,
};
pub use service::{LogListener, MontageService, SubmittedJob};
pub use store::{InMemoryJobStore, JobStore, ProgressSink, RecordedEvent};
pub use types::{MontageRequest, RenderJob, SourceRef};

pub(crate) use types::short_id;
