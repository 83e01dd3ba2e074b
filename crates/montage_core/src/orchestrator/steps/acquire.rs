//! Acquire step - turns the request's source reference into a local file.

use std::path::Path;

use crate::error::MontageError;
use crate::jobs::{download_video, resolve_library_video, SourceRef};
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

pub struct AcquireStep;

impl AcquireStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AcquireStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AcquireStep {
    fn name(&self) -> &str {
        "Acquire"
    }

    fn description(&self) -> &str {
        "Resolving source video"
    }

    fn validate_input(&self, ctx: &Context, _state: &JobState) -> StepResult<()> {
        if ctx.job.source.is_remote() && ctx.download_dir.is_none() {
            return Err(MontageError::invalid_option(
                "video URL",
                "no download folder was prepared for this job",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let path = match &ctx.job.source {
            SourceRef::Local(path) => {
                state.source_video = Some(path.clone());
                return Ok(StepOutcome::Skipped("source is a local file".to_string()));
            }
            SourceRef::Library(name) => {
                let library = Path::new(&ctx.settings.paths.library_folder);
                resolve_library_video(library, name)?
            }
            SourceRef::Url(url) => {
                let dir = ctx.download_dir.as_deref().ok_or_else(|| {
                    MontageError::invalid_option("video URL", "no download folder")
                })?;
                ctx.processing(&format!("Downloading video from {}", url));
                download_video(
                    ctx.runner(),
                    &ctx.logger,
                    &ctx.settings.tools.downloader,
                    url,
                    dir,
                )?
            }
        };

        ctx.logger
            .info(&format!("Using source video {}", path.display()));
        state.source_video = Some(path);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let path = state.require_source_video()?;
        if !path.is_file() {
            return Err(MontageError::input_not_found("Input video", path));
        }
        Ok(())
    }
}
