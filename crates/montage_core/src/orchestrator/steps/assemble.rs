//! Assemble step - concatenates intermediates and applies the audio mode.

use std::fs;

use crate::error::MontageError;
use crate::media::{write_manifest, AssembleCommandBuilder};
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Manifest-driven concatenation into the job's output path.
///
/// Without external audio the streams are copied. Replace mode copies the
/// video and takes audio from the external file; mix mode re-encodes.
pub struct AssembleStep;

impl AssembleStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AssembleStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AssembleStep {
    fn name(&self) -> &str {
        "Assemble"
    }

    fn description(&self) -> &str {
        "Assembling final video"
    }

    fn validate_input(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        if state.intermediates.is_empty() {
            return Err(MontageError::empty_plan("no intermediate clips to concatenate"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let manifest = write_manifest(&ctx.work_dir, &state.intermediates)?;
        state.manifest = Some(manifest.clone());

        let output = &ctx.job.output_path;
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MontageError::io(format!("creating output folder {}", parent.display()), e)
            })?;
        }

        let options = &ctx.job.options;
        let mut builder = AssembleCommandBuilder::new(&ctx.settings.render, &manifest, output);
        match &options.external_audio {
            Some(audio) => {
                let file_name = audio
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ctx.processing(&format!(
                    "Combining {} clips with external audio {} ({})",
                    state.intermediates.len(),
                    file_name,
                    options.audio_mix_mode
                ));
                builder = builder.external_audio(audio, options.audio_mix_mode);
            }
            None => ctx.processing(&format!(
                "Concatenating {} clips",
                state.intermediates.len()
            )),
        }

        ctx.invoke(
            &ctx.settings.tools.ffmpeg,
            &builder.build(),
            "final video assembly",
        )?;

        state.output = Some(output.clone());
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        let output = state.require_output()?;
        if !output.is_file() {
            return Err(MontageError::tool_failure(
                "final video assembly",
                Some(0),
                format!("ffmpeg reported success but {} is missing", output.display()),
            ));
        }
        Ok(())
    }
}
