//! Scene duration planning from beat timestamps.
//!
//! Consecutive beat intervals are grouped greedily until the group spans at
//! least the minimum duration. The final group always runs to the last beat,
//! so no beat interval is dropped and the planned durations add up to the
//! span between the starting beat and the last beat.

/// Iterator over beat-grouped scene durations.
///
/// Each item is the span of one group, in montage order. Runs in linear
/// time over the beat slice and holds no state beyond a cursor.
#[derive(Debug, Clone)]
pub struct SceneGroups<'a> {
    beats: &'a [f64],
    cursor: usize,
    min_duration: f64,
}

impl<'a> SceneGroups<'a> {
    /// Start grouping at `beats[start_index]`.
    pub fn new(beats: &'a [f64], start_index: usize, min_duration: f64) -> Self {
        Self {
            beats,
            cursor: start_index,
            min_duration,
        }
    }
}

impl Iterator for SceneGroups<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let last = self.beats.len().checked_sub(1)?;

        while self.cursor < last {
            let group_start = self.beats[self.cursor];
            let mut end = self.cursor;
            let mut span = 0.0;

            // Extend until the floor is met or the last beat is reached.
            // Zero-length intervals never close a group on their own.
            while end < last {
                end += 1;
                span = self.beats[end] - group_start;
                if span > 0.0 && span >= self.min_duration {
                    break;
                }
            }

            self.cursor = end;
            if span > 0.0 {
                return Some(span);
            }
        }

        None
    }
}

/// Plan scene durations for the beats from `start_index` onward.
///
/// Every returned duration is `>= min_duration` except possibly the last.
/// Returns an empty vector when fewer than two beats remain.
pub fn plan_scene_durations(beats: &[f64], start_index: usize, min_duration: f64) -> Vec<f64> {
    SceneGroups::new(beats, start_index, min_duration).collect()
}

/// Length of the opening scene that plays before the first beat.
///
/// - With markers: `beats[0]` when positive, otherwise 0 (no opening scene).
/// - Without markers: the requested total duration if one is set, otherwise
///   `fallback`. Clamping to the source length happens when clips are built.
pub fn initial_scene_duration(beats: &[f64], target_total: Option<f64>, fallback: f64) -> f64 {
    match beats.first() {
        Some(&first) if first > 0.0 => first,
        Some(_) => 0.0,
        None => match target_total {
            Some(total) if total > 0.0 => total,
            _ => fallback.max(0.0),
        },
    }
}
