//! Montage Core - beat-synced montage planning and rendering
//!
//! Turns a source video and a file of beat markers into a montage of
//! randomly sampled clips cut on the beats. Planning is pure; rendering
//! drives ffmpeg/ffprobe through a [`media::CommandRunner`].
//!
//! Typical use goes through [`jobs::MontageService`]:
//!
//! ```ignore
//! let service = MontageService::new(settings, Arc::new(SystemRunner), store);
//! let job = service.submit(MontageRequest::new(source, "beats.txt"))?;
//! ```

pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod media;
pub mod models;
pub mod orchestrator;
pub mod planning;

pub use error::{MontageError, MontageResult};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
