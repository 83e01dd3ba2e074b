//! Montage options and output resolution.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::enums::AudioMixMode;
use crate::error::MontageError;

/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = MontageError;

    /// Parse `WxH` (e.g. `1280x720`, case-insensitive separator).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            MontageError::invalid_option(
                "output resolution",
                format!("'{}'. Use WxH (e.g., 1280x720)", s),
            )
        };

        let lowered = s.trim().to_ascii_lowercase();
        let (w, h) = lowered.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Resolved options for one montage render.
///
/// Zero in `target_total_duration` or `target_scene_count` means the
/// corresponding limit is not applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MontageOptions {
    pub resolution: Resolution,
    /// Requested montage length in seconds (0 = unbounded).
    pub target_total_duration: f64,
    /// Requested number of scenes (0 = unbounded).
    pub target_scene_count: u32,
    /// Floor for beat-grouped scene lengths, seconds.
    pub min_grouped_duration: f64,
    /// Optional external audio track.
    pub external_audio: Option<PathBuf>,
    pub audio_mix_mode: AudioMixMode,
}

impl MontageOptions {
    /// Check numeric ranges.
    pub fn validate(&self) -> Result<(), MontageError> {
        if !self.target_total_duration.is_finite() || self.target_total_duration < 0.0 {
            return Err(MontageError::invalid_option(
                "total duration",
                format!("{} (must be 0 or a positive number of seconds)", self.target_total_duration),
            ));
        }
        if !self.min_grouped_duration.is_finite() || self.min_grouped_duration <= 0.0 {
            return Err(MontageError::invalid_option(
                "minimum scene duration",
                format!("{} (must be greater than 0)", self.min_grouped_duration),
            ));
        }
        Ok(())
    }

    /// Duration limit, or `None` when unbounded.
    pub fn duration_limit(&self) -> Option<f64> {
        (self.target_total_duration > 0.0).then_some(self.target_total_duration)
    }

    /// Scene-count limit, or `None` when unbounded.
    pub fn scene_limit(&self) -> Option<u32> {
        (self.target_scene_count > 0).then_some(self.target_scene_count)
    }
}
