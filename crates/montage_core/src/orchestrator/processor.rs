//! Render processor: runs one montage request through the pipeline.
//!
//! Owns the per-job resources (logger, work area, download folder, RNG)
//! and turns the pipeline outcome into exactly one terminal progress event.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use crate::config::Settings;
use crate::error::MontageError;
use crate::jobs::{short_id, MontageRequest, ProgressSink, RenderJob};
use crate::logging::{JobLogger, LogCallback, LogConfig};
use crate::media::CommandRunner;
use crate::models::ProgressEvent;

use super::errors::{PipelineError, PipelineResult};
use super::types::{Context, JobState};
use super::{create_montage_pipeline, PipelineRunResult};

/// Prefix of per-job work areas under `paths.temp_root`.
pub const WORK_AREA_PREFIX: &str = "rhythmic_montage_";

/// Result of processing a single job.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub job_id: String,
    pub success: bool,
    pub output_path: Option<PathBuf>,
    /// Duration measured on the finished output, when verification worked.
    pub output_duration: Option<f64>,
    pub error: Option<String>,
    /// `MontageError::kind()` of the failure.
    pub error_kind: Option<&'static str>,
    pub steps_completed: Vec<String>,
    pub steps_skipped: Vec<String>,
}

impl JobResult {
    fn success(job_id: &str, finished: FinishedRender) -> Self {
        Self {
            job_id: job_id.to_string(),
            success: true,
            output_path: Some(finished.output_path),
            output_duration: finished.verified_duration,
            error: None,
            error_kind: None,
            steps_completed: finished.run_result.steps_completed,
            steps_skipped: finished.run_result.steps_skipped,
        }
    }

    fn failure(job_id: &str, error: &MontageError) -> Self {
        Self {
            job_id: job_id.to_string(),
            success: false,
            output_path: None,
            output_duration: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        }
    }
}

struct FinishedRender {
    output_path: PathBuf,
    verified_duration: Option<f64>,
    run_result: PipelineRunResult,
}

/// Runs montage requests through the standard pipeline.
///
/// # Example
///
/// ```ignore
/// let processor = RenderProcessor::new(settings, runner, store);
/// let result = processor.process("3f2a...", &request, None);
/// ```
pub struct RenderProcessor {
    settings: Arc<Settings>,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn ProgressSink>,
    log_config: LogConfig,
}

impl RenderProcessor {
    pub fn new(
        settings: Arc<Settings>,
        runner: Arc<dyn CommandRunner>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let log_config = LogConfig::from_settings(&settings.logging);
        Self {
            settings,
            runner,
            sink,
            log_config,
        }
    }

    /// Process one job to a terminal state.
    ///
    /// Reports `processing` events while running and exactly one terminal
    /// `completed` or `error` event. The work area is gone by the time the
    /// terminal event is reported.
    pub fn process(
        &self,
        job_id: &str,
        request: &MontageRequest,
        log_callback: Option<LogCallback>,
    ) -> JobResult {
        self.sink
            .report(job_id, ProgressEvent::processing("Starting montage job"));

        match self.run(job_id, request, log_callback) {
            Ok(finished) => {
                let message = completion_message(&finished.output_path, finished.verified_duration);
                tracing::info!(job_id, "{}", message);
                self.sink.report(
                    job_id,
                    ProgressEvent::completed(message, &finished.output_path),
                );
                JobResult::success(job_id, finished)
            }
            Err(e) => {
                tracing::warn!(job_id, step = e.step_name().unwrap_or("setup"), "{}", e);
                let root = e.into_root();
                self.sink
                    .report(job_id, ProgressEvent::error(root.to_string()));
                JobResult::failure(job_id, &root)
            }
        }
    }

    fn run(
        &self,
        job_id: &str,
        request: &MontageRequest,
        log_callback: Option<LogCallback>,
    ) -> PipelineResult<FinishedRender> {
        let setup = |e: MontageError| PipelineError::setup_failed(job_id, e);
        let paths = &self.settings.paths;

        let logger = JobLogger::new(
            job_id,
            &paths.logs_folder,
            self.log_config.clone(),
            log_callback,
        )
        .map_err(|e| setup(MontageError::io("creating job log", e)))?;
        let logger = Arc::new(logger);
        logger.phase("Setup");
        logger.info(&format!("Job {} for {}", job_id, request.source.describe()));

        let options = request.resolve_options(&self.settings.defaults).map_err(|e| {
            logger.error(&e.to_string());
            setup(e)
        })?;

        let job = RenderJob {
            job_id: job_id.to_string(),
            source: request.source.clone(),
            markers: request.markers.clone(),
            output_path: RenderJob::output_path_for(Path::new(&paths.output_folder), job_id),
            options,
        };

        let work_area = create_scoped_dir(Path::new(&paths.temp_root), WORK_AREA_PREFIX)
            .map_err(|e| setup(MontageError::io("creating work area", e)))?;
        let downloads = if job.source.is_remote() {
            let prefix = format!("{}_", short_id(job_id));
            Some(
                create_scoped_dir(Path::new(&paths.downloads_folder), &prefix)
                    .map_err(|e| setup(MontageError::io("creating download folder", e)))?,
            )
        } else {
            None
        };
        logger.debug(&format!("Work area: {}", work_area.path().display()));

        let rng = match self.settings.render.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut ctx = Context::new(
            job,
            Arc::clone(&self.settings),
            work_area.path().to_path_buf(),
            Arc::clone(&logger),
            Arc::clone(&self.runner),
            Arc::clone(&self.sink),
            rng,
        );
        if let Some(dir) = &downloads {
            ctx = ctx.with_download_dir(dir.path().to_path_buf());
        }

        let mut state = JobState::new(job_id);
        let outcome = create_montage_pipeline().run(&ctx, &mut state);

        remove_scoped_dir(work_area, &logger);
        if let Some(dir) = downloads {
            remove_scoped_dir(dir, &logger);
        }

        let run_result = outcome?;
        let output_path = state
            .output
            .clone()
            .unwrap_or_else(|| ctx.job.output_path.clone());
        logger.close();

        Ok(FinishedRender {
            output_path,
            verified_duration: state.verified_duration,
            run_result,
        })
    }
}

/// `Output video created: <name> (Duration: 12.34s)`
pub fn completion_message(output: &Path, verified_duration: Option<f64>) -> String {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| output.display().to_string());
    match verified_duration {
        Some(seconds) => format!("Output video created: {} (Duration: {:.2}s)", name, seconds),
        None => format!("Output video created: {}", name),
    }
}

fn create_scoped_dir(root: &Path, prefix: &str) -> std::io::Result<TempDir> {
    fs::create_dir_all(root)?;
    tempfile::Builder::new().prefix(prefix).tempdir_in(root)
}

fn remove_scoped_dir(dir: TempDir, logger: &JobLogger) {
    let path = dir.path().to_path_buf();
    match dir.close() {
        Ok(()) => logger.debug(&format!("Removed {}", path.display())),
        Err(e) => logger.warn(&format!("Could not remove {}: {}", path.display(), e)),
    }
}
