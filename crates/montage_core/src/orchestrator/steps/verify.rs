//! Verify step - probes the finished output as a sanity check.

use crate::media::probe_duration;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Optional: a failed probe is only a caveat on a completed job.
pub struct VerifyStep;

impl VerifyStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VerifyStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for VerifyStep {
    fn name(&self) -> &str {
        "Verify"
    }

    fn description(&self) -> &str {
        "Verifying output duration"
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        state.require_output().map(|_| ())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let output = state.require_output()?.to_path_buf();
        let duration = probe_duration(
            ctx.runner(),
            &ctx.logger,
            &ctx.settings.tools.ffprobe,
            &output,
        )?;

        let planned = state
            .clip_plan
            .as_ref()
            .map(|p| p.total_duration())
            .unwrap_or_default();
        ctx.logger.info(&format!(
            "Output duration {:.2}s (planned {:.2}s)",
            duration, planned
        ));
        state.verified_duration = Some(duration);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
        Ok(())
    }
}
