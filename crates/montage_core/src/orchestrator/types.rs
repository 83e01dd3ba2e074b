//! Core types for the orchestrator pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;

use crate::config::Settings;
use crate::error::{MontageError, MontageResult};
use crate::jobs::{ProgressSink, RenderJob};
use crate::logging::JobLogger;
use crate::media::{self, CommandOutput, CommandRunner};
use crate::models::ProgressEvent;
use crate::planning::{ClipPlan, ScenePlan};

/// Read-only context passed to pipeline steps.
///
/// Holds the job, its private work area and shared resources. Mutable
/// results go in `JobState`.
pub struct Context {
    pub job: RenderJob,
    pub settings: Arc<Settings>,
    /// Private work area; removed by its owner when the job ends.
    pub work_dir: PathBuf,
    /// Job-scoped download folder for remote sources.
    pub download_dir: Option<PathBuf>,
    pub logger: Arc<JobLogger>,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn ProgressSink>,
    rng: Mutex<StdRng>,
}

impl Context {
    pub fn new(
        job: RenderJob,
        settings: Arc<Settings>,
        work_dir: PathBuf,
        logger: Arc<JobLogger>,
        runner: Arc<dyn CommandRunner>,
        sink: Arc<dyn ProgressSink>,
        rng: StdRng,
    ) -> Self {
        Self {
            job,
            settings,
            work_dir,
            download_dir: None,
            logger,
            runner,
            sink,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = Some(dir);
        self
    }

    pub fn job_id(&self) -> &str {
        &self.job.job_id
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Send an event to the job's progress sink.
    pub fn report(&self, event: ProgressEvent) {
        self.sink.report(&self.job.job_id, event);
    }

    /// Report a `processing` event and log it.
    pub fn processing(&self, message: &str) {
        self.logger.info(message);
        self.report(ProgressEvent::processing(message));
    }

    /// Non-fatal diagnostic: logged as a warning and reported as a
    /// `processing` event. Never changes the job's terminal state.
    pub fn warn_progress(&self, message: &str) {
        self.logger.warn(message);
        self.report(ProgressEvent::processing(format!("Warning: {}", message)));
    }

    /// Run an external tool with job logging.
    pub fn invoke(
        &self,
        program: &str,
        args: &[String],
        operation: &str,
    ) -> MontageResult<CommandOutput> {
        media::invoke(self.runner(), &self.logger, program, args, operation)
    }

    /// Borrow the job's random source.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock();
        f(&mut *rng)
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Steps add their section and leave earlier sections untouched.
#[derive(Debug, Clone, Default)]
pub struct JobState {
    pub job_id: String,
    pub started_at: Option<String>,
    /// Resolved local source video (Acquire).
    pub source_video: Option<PathBuf>,
    /// Source length in seconds (Probe).
    pub source_duration: Option<f64>,
    /// Parsed beat timestamps (Plan).
    pub beats: Vec<f64>,
    /// Scene durations (Plan).
    pub scene_plan: Option<ScenePlan>,
    /// Clip specs with offsets (Plan).
    pub clip_plan: Option<ClipPlan>,
    /// Intermediate clips in sequence order (Extract).
    pub intermediates: Vec<PathBuf>,
    /// Concat manifest (Assemble).
    pub manifest: Option<PathBuf>,
    /// Final artifact (Assemble).
    pub output: Option<PathBuf>,
    /// Output duration from the sanity probe (Verify).
    pub verified_duration: Option<f64>,
}

impl JobState {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn require_source_video(&self) -> MontageResult<&Path> {
        self.source_video
            .as_deref()
            .ok_or_else(|| missing_result("source video"))
    }

    pub fn require_source_duration(&self) -> MontageResult<f64> {
        self.source_duration
            .ok_or_else(|| missing_result("source duration"))
    }

    pub fn require_clip_plan(&self) -> MontageResult<&ClipPlan> {
        self.clip_plan
            .as_ref()
            .ok_or_else(|| missing_result("clip plan"))
    }

    pub fn require_output(&self) -> MontageResult<&Path> {
        self.output.as_deref().ok_or_else(|| missing_result("output"))
    }
}

/// A step ran before the step that records `what`.
fn missing_result(what: &str) -> MontageError {
    MontageError::io(
        format!("reading job state ({} not recorded)", what),
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "pipeline steps out of order"),
    )
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    /// Nothing to do (not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_requires_recorded_sections() {
        let mut state = JobState::new("job-1");
        assert!(state.started_at.is_some());
        assert!(state.require_source_video().is_err());

        state.source_video = Some(PathBuf::from("/v/a.mp4"));
        state.source_duration = Some(12.0);
        assert_eq!(state.require_source_video().unwrap(), Path::new("/v/a.mp4"));
        assert_eq!(state.require_source_duration().unwrap(), 12.0);
        assert!(state.require_clip_plan().is_err());
    }
}
