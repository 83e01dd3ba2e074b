//! Validate step - checks tools and inputs before anything runs.

use crate::error::MontageError;
use crate::jobs::SourceRef;
use crate::media::require_tool;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Fails the job before any external invocation when a required tool or
/// input file is missing.
pub struct ValidateStep;

impl ValidateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ValidateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ValidateStep {
    fn name(&self) -> &str {
        "Validate"
    }

    fn description(&self) -> &str {
        "Checking tools and inputs"
    }

    fn validate_input(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, _state: &mut JobState) -> StepResult<StepOutcome> {
        let tools = &ctx.settings.tools;
        require_tool(ctx.runner(), &tools.ffmpeg)?;
        require_tool(ctx.runner(), &tools.ffprobe)?;

        match &ctx.job.source {
            SourceRef::Local(path) => {
                if !path.is_file() {
                    return Err(MontageError::input_not_found("Input video", path));
                }
            }
            SourceRef::Library(_) => {}
            SourceRef::Url(_) => require_tool(ctx.runner(), &tools.downloader)?,
        }

        if !ctx.job.markers.is_file() {
            return Err(MontageError::input_not_found("Label file", &ctx.job.markers));
        }

        if let Some(audio) = &ctx.job.options.external_audio {
            if !audio.is_file() {
                return Err(MontageError::input_not_found("External audio file", audio));
            }
        }

        ctx.logger.info(&format!(
            "Source: {}; labels: {}; resolution {}",
            ctx.job.source.describe(),
            ctx.job.markers.display(),
            ctx.job.options.resolution
        ));
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
        Ok(())
    }
}
