//! Probe step - reads the source video's duration.

use crate::media::probe_duration;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

pub struct ProbeStep;

impl ProbeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProbeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ProbeStep {
    fn name(&self) -> &str {
        "Probe"
    }

    fn description(&self) -> &str {
        "Reading source video duration"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        state.require_source_video().map(|_| ())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let source = state.require_source_video()?.to_path_buf();
        let duration = probe_duration(
            ctx.runner(),
            &ctx.logger,
            &ctx.settings.tools.ffprobe,
            &source,
        )?;

        ctx.logger
            .info(&format!("Source video duration: {:.2}s", duration));
        state.source_duration = Some(duration);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        state.require_source_duration().map(|_| ())
    }
}
