//! Pipeline step trait definition.

use super::errors::StepResult;
use super::types::{Context, JobState, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// # Example
///
/// ```ignore
/// struct ProbeStep;
///
/// impl PipelineStep for ProbeStep {
///     fn name(&self) -> &str { "Probe" }
///
///     fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
///         state.require_source_video().map(|_| ())
///     }
///
///     fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
///         state.source_duration = Some(42.0);
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Step name for logging and error context.
    fn name(&self) -> &str;

    /// Check preconditions (inputs exist, earlier steps recorded their
    /// results).
    fn validate_input(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Perform the step's work and record results in `state`.
    ///
    /// Returns `StepOutcome::Skipped` when there was nothing to do.
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome>;

    /// Verify the step produced valid output. Only called after `Success`.
    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Optional steps downgrade their failures to a warning.
    fn is_optional(&self) -> bool {
        false
    }

    /// Progress message reported when the step starts.
    fn description(&self) -> &str {
        self.name()
    }
}
