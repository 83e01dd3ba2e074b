//! Extract step - cuts every planned clip into a normalized intermediate.

use crate::error::MontageError;
use crate::media::ExtractCommandBuilder;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Extracts clips one at a time, in sequence order.
///
/// Any failed extraction aborts the job; there are no retries.
pub struct ExtractStep;

impl ExtractStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExtractStep {
    fn name(&self) -> &str {
        "Extract"
    }

    fn description(&self) -> &str {
        "Extracting scenes"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        state.require_source_video()?;
        let plan = state.require_clip_plan()?;
        if plan.clips.is_empty() {
            return Err(MontageError::empty_plan("no clips to extract"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let source = state.require_source_video()?.to_path_buf();
        let clips = state.require_clip_plan()?.clips.clone();
        let total = clips.len();

        let mut intermediates = Vec::with_capacity(total);
        for (done, clip) in clips.iter().enumerate() {
            let scene_number = clip.sequence_index + 1;
            let output = ctx.work_dir.join(clip.file_name());
            ctx.processing(&format!(
                "Extracting scene {}/{} ({:.2}s from {:.2}s)",
                scene_number, total, clip.duration, clip.source_start
            ));

            let args = ExtractCommandBuilder::new(
                &ctx.settings.render,
                &source,
                clip,
                ctx.job.options.resolution,
                &output,
            )
            .build();
            ctx.invoke(
                &ctx.settings.tools.ffmpeg,
                &args,
                &format!("extracting scene {}", scene_number),
            )?;

            intermediates.push(output);
            ctx.logger.progress(done + 1, total);
        }

        state.intermediates = intermediates;
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        for path in &state.intermediates {
            if !path.is_file() {
                return Err(MontageError::tool_failure(
                    format!("extracting {}", path.display()),
                    Some(0),
                    "ffmpeg reported success but produced no file",
                ));
            }
        }
        Ok(())
    }
}
