//! Scene selection against duration and scene-count targets.

/// Limits applied while selecting scenes. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionLimits {
    pub total_duration: Option<f64>,
    pub scene_count: Option<u32>,
    /// Smallest truncated final scene worth keeping, seconds.
    pub min_final_scene: f64,
}

/// Budget already consumed before selection starts (e.g. by the opening scene).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsedBudget {
    pub duration: f64,
    pub count: u32,
}

/// Select a prefix of `candidates` that fits the limits.
///
/// Candidates are taken in order. Whichever limit is reached first stops
/// selection. When a full candidate would overrun the duration budget, a
/// truncated scene equal to the remaining budget is emitted instead,
/// provided it is longer than `min_final_scene`.
pub fn select_scenes(candidates: &[f64], limits: &SelectionLimits, used: UsedBudget) -> Vec<f64> {
    let mut selected = Vec::new();
    let budget = limits
        .total_duration
        .map(|total| (total - used.duration).max(0.0));
    let mut accumulated = 0.0;

    for &candidate in candidates {
        if let Some(max_count) = limits.scene_count {
            if used.count as usize + selected.len() >= max_count as usize {
                break;
            }
        }

        match budget {
            Some(budget) => {
                if accumulated + candidate <= budget {
                    selected.push(candidate);
                    accumulated += candidate;
                } else {
                    let remaining = budget - accumulated;
                    if remaining > limits.min_final_scene {
                        selected.push(remaining);
                    }
                    break;
                }
            }
            None => selected.push(candidate),
        }
    }

    selected
}
