//! Plan step - parses labels and decides every clip before extraction.

use crate::error::MontageError;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::planning::{load_markers, plan_montage, PlanRequest};

/// Runs the pure planning stages: marker parsing, scene grouping,
/// selection and offset drawing.
///
/// Skipped label lines and skipped scenes are reported as warnings. A plan
/// with no clips fails with `EmptyPlan` before any extraction starts.
pub struct PlanStep;

impl PlanStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PlanStep {
    fn name(&self) -> &str {
        "Plan"
    }

    fn description(&self) -> &str {
        "Planning scenes from beat labels"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        state.require_source_duration().map(|_| ())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let markers = load_markers(&ctx.job.markers)?;
        for line in &markers.skipped {
            ctx.warn_progress(&format!(
                "Could not parse start time from label line {}: '{}'",
                line.line_number, line.content
            ));
        }
        if markers.is_empty() {
            ctx.warn_progress("No valid beat timestamps found in label file");
        } else {
            ctx.logger
                .info(&format!("Parsed {} beat timestamps", markers.beats.len()));
        }

        let options = &ctx.job.options;
        let render = &ctx.settings.render;
        let source_duration = state.require_source_duration()?;
        let request = PlanRequest {
            beats: &markers.beats,
            source_duration,
            min_grouped_duration: options.min_grouped_duration,
            target_total: options.duration_limit(),
            target_count: options.scene_limit(),
            fallback_scene: render.fallback_scene_duration,
            min_final_scene: render.min_final_scene,
        };

        let (scenes, clips) = ctx.with_rng(|rng| plan_montage(&request, rng));

        ctx.logger.debug(&format!(
            "Opening scene {:.3}s; {} candidate scenes; {} selected",
            scenes.opening,
            scenes.candidates.len(),
            scenes.selected.len()
        ));
        for skipped in &clips.skipped {
            ctx.warn_progress(&format!(
                "Skipping scene {}: {}",
                skipped.scene_number, skipped.reason
            ));
        }

        state.beats = markers.beats;
        state.scene_plan = Some(scenes);

        if clips.clips.is_empty() {
            state.clip_plan = Some(clips);
            return Err(MontageError::empty_plan(
                "every planned scene was skipped or no scenes could be planned \
                 (source video may be too short or the parameters too restrictive)",
            ));
        }

        ctx.processing(&format!(
            "Planned {} scenes ({:.2}s total)",
            clips.clips.len(),
            clips.total_duration()
        ));
        state.clip_plan = Some(clips);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let source_duration = state.require_source_duration()?;
        let plan = state.require_clip_plan()?;
        // Offsets must never read past the end of the source.
        for clip in &plan.clips {
            if clip.duration <= 0.0 || clip.source_end() > source_duration + 1e-9 {
                return Err(MontageError::empty_plan(format!(
                    "clip {} ({:.3}s at {:.3}s) does not fit the source",
                    clip.sequence_index, clip.duration, clip.source_start
                )));
            }
        }
        Ok(())
    }
}
