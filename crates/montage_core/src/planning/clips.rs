//! Clip plan building: random, bounds-checked source offsets per scene.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::ClipSpec;

/// Where a planned scene came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// Plays before the first beat. May be clamped to the source length.
    Opening,
    /// Beat-synced scene. Skipped when longer than the source.
    Beat,
}

/// A scene selected for the montage, before a source offset is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedScene {
    pub kind: SceneKind,
    pub duration: f64,
}

impl PlannedScene {
    pub fn opening(duration: f64) -> Self {
        Self {
            kind: SceneKind::Opening,
            duration,
        }
    }

    pub fn beat(duration: f64) -> Self {
        Self {
            kind: SceneKind::Beat,
            duration,
        }
    }
}

/// A scene that was left out of the clip plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedScene {
    /// 1-based position in the planned scene list.
    pub scene_number: usize,
    pub duration: f64,
    pub reason: String,
}

/// Clip specs ready for extraction, plus the scenes that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipPlan {
    pub clips: Vec<ClipSpec>,
    pub skipped: Vec<SkippedScene>,
}

impl ClipPlan {
    /// Sum of all clip durations, seconds.
    pub fn total_duration(&self) -> f64 {
        self.clips.iter().map(|c| c.duration).sum()
    }
}

/// Choose a start offset for every scene.
///
/// A scene at least as long as the source starts at 0 and is clamped to the
/// source length when it is the opening scene; a beat scene longer than the
/// source is skipped so beat alignment is never distorted. Offsets for the
/// rest are drawn uniformly from `[0, source_duration - duration]`.
pub fn build_clip_plan<R: Rng + ?Sized>(
    scenes: &[PlannedScene],
    source_duration: f64,
    rng: &mut R,
) -> ClipPlan {
    let mut plan = ClipPlan::default();

    for (idx, scene) in scenes.iter().enumerate() {
        let scene_number = idx + 1;
        let skip = |reason: String| SkippedScene {
            scene_number,
            duration: scene.duration,
            reason,
        };

        if !(scene.duration > 0.0) {
            plan.skipped.push(skip("scene has no length".to_string()));
            continue;
        }
        if !(source_duration > 0.0) {
            plan.skipped.push(skip("source video has no playable duration".to_string()));
            continue;
        }

        let (source_start, duration) = if scene.duration >= source_duration {
            if scene.kind == SceneKind::Beat && scene.duration > source_duration {
                plan.skipped.push(skip(format!(
                    "duration ({:.2}s) is longer than input video ({:.2}s)",
                    scene.duration, source_duration
                )));
                continue;
            }
            (0.0, source_duration)
        } else {
            let max_start = source_duration - scene.duration;
            (rng.gen_range(0.0..=max_start), scene.duration)
        };

        plan.clips.push(ClipSpec {
            source_start,
            duration,
            sequence_index: plan.clips.len(),
        });
    }

    plan
}
