//! Pipeline orchestrator for rendering montages.
//!
//! Each job runs a fixed sequence of steps that validate, execute and
//! record their results in a `JobState`. Steps run strictly one after
//! another; only Acquire, Probe, Extract, Assemble and Verify invoke
//! external tools.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Validate   (tools and input files)
//!     ├── Step: Acquire    (library lookup / download)
//!     ├── Step: Probe      (source duration)
//!     ├── Step: Plan       (markers → scenes → clips)
//!     ├── Step: Extract    (one ffmpeg call per clip)
//!     ├── Step: Assemble   (manifest concat + audio mode)
//!     └── Step: Verify     (optional output probe)
//! ```

mod errors;
mod pipeline;
mod processor;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use processor::{completion_message, JobResult, RenderProcessor, WORK_AREA_PREFIX};
pub use step::PipelineStep;
pub use steps::{
    AcquireStep, AssembleStep, ExtractStep, PlanStep, ProbeStep, ValidateStep, VerifyStep,
};
pub use types::{Context, JobState, StepOutcome};

/// Create the montage pipeline with all steps in order.
pub fn create_montage_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ValidateStep::new())
        .with_step(AcquireStep::new())
        .with_step(ProbeStep::new())
        .with_step(PlanStep::new())
        .with_step(ExtractStep::new())
        .with_step(AssembleStep::new())
        .with_step(VerifyStep::new())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::{tempdir, TempDir};

    use super::Context;
    use crate::config::Settings;
    use crate::jobs::{InMemoryJobStore, ProgressSink, RenderJob, SourceRef};
    use crate::logging::{JobLogger, LogConfig};
    use crate::media::RecordingRunner;
    use crate::models::{AudioMixMode, MontageOptions, Resolution};

    /// Context over a temp dir with a recording runner and in-memory store.
    pub fn test_context() -> (TempDir, Context, Arc<InMemoryJobStore>) {
        let dir = tempdir().unwrap();
        let logger =
            Arc::new(JobLogger::new("test-job", dir.path(), LogConfig::default(), None).unwrap());
        let store = Arc::new(InMemoryJobStore::new());
        let sink: Arc<dyn ProgressSink> = store.clone();

        let job = RenderJob {
            job_id: "test-job".to_string(),
            source: SourceRef::Local(dir.path().join("in.mp4")),
            markers: dir.path().join("beats.txt"),
            output_path: dir.path().join("out").join("montage.mp4"),
            options: MontageOptions {
                resolution: Resolution::new(1280, 720),
                target_total_duration: 0.0,
                target_scene_count: 0,
                min_grouped_duration: 0.6,
                external_audio: None,
                audio_mix_mode: AudioMixMode::Replace,
            },
        };

        let ctx = Context::new(
            job,
            Arc::new(Settings::default()),
            dir.path().to_path_buf(),
            logger,
            Arc::new(RecordingRunner::new()),
            sink,
            StdRng::seed_from_u64(7),
        );
        (dir, ctx, store)
    }

    #[test]
    fn standard_pipeline_order() {
        assert_eq!(
            super::create_montage_pipeline().step_names(),
            vec!["Validate", "Acquire", "Probe", "Plan", "Extract", "Assemble", "Verify"]
        );
    }
}
