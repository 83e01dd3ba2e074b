//! Pipeline runner that executes steps in sequence.

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, JobState, StepOutcome};

/// Pipeline that runs a sequence of steps.
///
/// Steps run strictly one after another; the first failing required step
/// stops the run. There is no cancellation: a started job runs to a
/// terminal state. Step boundaries are where a cancellation check would go.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run every step against `ctx` and `state`.
    ///
    /// For each step:
    /// 1. Report a `processing` event with the step description
    /// 2. Run `validate_input`
    /// 3. Run `execute`
    /// 4. Run `validate_output` (if execute returned Success)
    ///
    /// A failing optional step is logged and reported as a warning and the
    /// run continues.
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult::default();

        for step in &self.steps {
            let step_name = step.name();
            ctx.logger.phase(step_name);
            ctx.processing(step.description());

            match run_step(step.as_ref(), ctx, state) {
                Ok(StepOutcome::Success) => {
                    ctx.logger.success(&format!("{} completed", step_name));
                    result.steps_completed.push(step_name.to_string());
                }
                Ok(StepOutcome::Skipped(reason)) => {
                    ctx.logger.info(&format!("{} skipped: {}", step_name, reason));
                    result.steps_skipped.push(step_name.to_string());
                }
                Err(e) if step.is_optional() => {
                    ctx.warn_progress(&format!("{} skipped: {}", step_name, e));
                    result.steps_skipped.push(step_name.to_string());
                }
                Err(e) => {
                    ctx.logger.error(&format!("{} failed: {}", step_name, e));
                    return Err(PipelineError::step_failed(ctx.job_id(), step_name, e));
                }
            }
        }

        ctx.logger.success("Pipeline completed successfully");
        Ok(result)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn run_step(
    step: &dyn PipelineStep,
    ctx: &Context,
    state: &mut JobState,
) -> super::errors::StepResult<StepOutcome> {
    ctx.logger
        .debug(&format!("Validating input for '{}'", step.name()));
    step.validate_input(ctx, state)?;

    let outcome = step.execute(ctx, state)?;
    if outcome == StepOutcome::Success {
        ctx.logger
            .debug(&format!("Validating output for '{}'", step.name()));
        step.validate_output(ctx, state)?;
    }
    Ok(outcome)
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunResult {
    pub steps_completed: Vec<String>,
    pub steps_skipped: Vec<String>,
}

impl PipelineRunResult {
    /// Check if all steps completed (none skipped).
    pub fn all_completed(&self) -> bool {
        self.steps_skipped.is_empty()
    }
}
