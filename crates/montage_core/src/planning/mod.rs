//! Montage planning.
//!
//! All functions here are pure over numeric data (the label file loader is
//! the only one that touches the filesystem), so each stage can be tested
//! without media tools.
//!
//! ```text
//! label file ──> parse_markers ──> plan_scene_durations ──> select_scenes ──> build_clip_plan
//!                                  initial_scene_duration ─┘
//! ```

mod clips;
mod markers;
mod scenes;
mod selection;

pub use clips::{build_clip_plan, ClipPlan, PlannedScene, SceneKind, SkippedScene};
pub use markers::{load_markers, parse_markers, MarkerSet, SkippedLine, MARKER_FIELD_SEPARATOR};
pub use scenes::{initial_scene_duration, plan_scene_durations, SceneGroups};
pub use selection::{select_scenes, SelectionLimits, UsedBudget};

use rand::Rng;

/// Inputs for planning a whole montage.
#[derive(Debug, Clone, Copy)]
pub struct PlanRequest<'a> {
    pub beats: &'a [f64],
    pub source_duration: f64,
    pub min_grouped_duration: f64,
    pub target_total: Option<f64>,
    pub target_count: Option<u32>,
    /// Opening scene length used when there are no markers.
    pub fallback_scene: f64,
    pub min_final_scene: f64,
}

/// Scene durations chosen for a montage, before offsets are drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenePlan {
    /// Opening scene length after clamping to the source (0 = none).
    pub opening: f64,
    /// All beat-grouped candidates.
    pub candidates: Vec<f64>,
    /// Beat scenes selected for the montage.
    pub selected: Vec<f64>,
}

impl ScenePlan {
    /// Planned scenes in montage order.
    pub fn scenes(&self) -> Vec<PlannedScene> {
        let opening = (self.opening > 0.0).then(|| PlannedScene::opening(self.opening));
        opening
            .into_iter()
            .chain(self.selected.iter().map(|&d| PlannedScene::beat(d)))
            .collect()
    }
}

/// Compute scene durations: opening scene, grouped candidates and selection.
///
/// Deterministic for identical inputs.
pub fn plan_scenes(req: &PlanRequest<'_>) -> ScenePlan {
    let opening_wanted = initial_scene_duration(req.beats, req.target_total, req.fallback_scene);
    let opening = opening_wanted.min(req.source_duration.max(0.0));

    let candidates = if req.beats.len() > 1 {
        plan_scene_durations(req.beats, 0, req.min_grouped_duration)
    } else {
        Vec::new()
    };

    let used = UsedBudget {
        duration: opening,
        count: u32::from(opening > 0.0),
    };
    let limits = SelectionLimits {
        total_duration: req.target_total,
        scene_count: req.target_count,
        min_final_scene: req.min_final_scene,
    };
    let selected = select_scenes(&candidates, &limits, used);

    ScenePlan {
        opening,
        candidates,
        selected,
    }
}

/// Plan scenes and draw source offsets in one go.
pub fn plan_montage<R: Rng + ?Sized>(req: &PlanRequest<'_>, rng: &mut R) -> (ScenePlan, ClipPlan) {
    let scenes = plan_scenes(req);
    let clips = build_clip_plan(&scenes.scenes(), req.source_duration, rng);
    (scenes, clips)
}
