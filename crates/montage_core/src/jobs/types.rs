//! Request and job types at the submission boundary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::acquire::{has_extension, AUDIO_EXTENSIONS, MARKER_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::config::RequestDefaults;
use crate::error::{MontageError, MontageResult};
use crate::models::{AudioMixMode, MontageOptions, Resolution};

/// Where the source video comes from. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SourceRef {
    /// A file on disk.
    Local(PathBuf),
    /// A file name inside the configured library folder.
    Library(String),
    /// A remote video fetched with the downloader tool.
    Url(String),
}

impl SourceRef {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Short human-readable description for log lines.
    pub fn describe(&self) -> String {
        match self {
            Self::Local(path) => format!("local file {}", path.display()),
            Self::Library(name) => format!("library video '{}'", name),
            Self::Url(url) => format!("URL {}", url),
        }
    }
}

/// A montage request as received from a caller, before defaults are applied.
///
/// String-typed options (`resolution`, `audio_mode`) are kept raw so that
/// malformed values surface as `InvalidOption` when the job is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MontageRequest {
    pub source: SourceRef,
    /// Tab-separated label file with beat timestamps.
    pub markers: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_audio: Option<PathBuf>,
    /// `WxH`; `[defaults] resolution` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Seconds, 0 = unbounded.
    #[serde(default)]
    pub target_total_duration: f64,
    /// 0 = unbounded.
    #[serde(default)]
    pub target_scene_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_scene_duration: Option<f64>,
    /// `replace` or `mix`; `[defaults] audio_mode` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_mode: Option<String>,
}

impl MontageRequest {
    pub fn new(source: SourceRef, markers: impl Into<PathBuf>) -> Self {
        Self {
            source,
            markers: markers.into(),
            external_audio: None,
            resolution: None,
            target_total_duration: 0.0,
            target_scene_count: 0,
            min_scene_duration: None,
            audio_mode: None,
        }
    }

    pub fn with_external_audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.external_audio = Some(path.into());
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_target_duration(mut self, seconds: f64) -> Self {
        self.target_total_duration = seconds;
        self
    }

    pub fn with_scene_count(mut self, count: u32) -> Self {
        self.target_scene_count = count;
        self
    }

    pub fn with_min_scene_duration(mut self, seconds: f64) -> Self {
        self.min_scene_duration = Some(seconds);
        self
    }

    pub fn with_audio_mode(mut self, mode: impl Into<String>) -> Self {
        self.audio_mode = Some(mode.into());
        self
    }

    /// Apply defaults and parse string options.
    ///
    /// Pure: no filesystem or tool access, so a malformed option is
    /// rejected before anything runs.
    pub fn resolve_options(&self, defaults: &RequestDefaults) -> MontageResult<MontageOptions> {
        let resolution: Resolution = self
            .resolution
            .as_deref()
            .unwrap_or(&defaults.resolution)
            .parse()?;

        let audio_mix_mode = match self.audio_mode.as_deref() {
            Some(raw) => raw.parse::<AudioMixMode>()?,
            None => defaults.audio_mode,
        };

        let options = MontageOptions {
            resolution,
            target_total_duration: self.target_total_duration,
            target_scene_count: self.target_scene_count,
            min_grouped_duration: self
                .min_scene_duration
                .unwrap_or(defaults.min_scene_duration),
            external_audio: self.external_audio.clone(),
            audio_mix_mode,
        };
        options.validate()?;
        Ok(options)
    }

    /// Reject files whose extension does not match their role.
    pub fn validate_extensions(&self) -> MontageResult<()> {
        match &self.source {
            SourceRef::Local(path) => check_kind("video file", path, VIDEO_EXTENSIONS)?,
            SourceRef::Library(name) => check_kind("video file", Path::new(name), VIDEO_EXTENSIONS)?,
            SourceRef::Url(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(MontageError::invalid_option(
                        "video URL",
                        format!("'{}' is not an http(s) URL", url),
                    ));
                }
            }
        }
        check_kind("label file", &self.markers, MARKER_EXTENSIONS)?;
        if let Some(audio) = &self.external_audio {
            check_kind("audio file", audio, AUDIO_EXTENSIONS)?;
        }
        Ok(())
    }
}

fn check_kind(option: &str, path: &Path, allowed: &[&str]) -> MontageResult<()> {
    if has_extension(path, allowed) {
        Ok(())
    } else {
        Err(MontageError::invalid_option(
            option,
            format!(
                "'{}' (allowed extensions: {})",
                path.display(),
                allowed.join(", ")
            ),
        ))
    }
}

/// One resolved unit of rendering work.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub job_id: String,
    pub source: SourceRef,
    pub markers: PathBuf,
    /// Final artifact location.
    pub output_path: PathBuf,
    pub options: MontageOptions,
}

impl RenderJob {
    /// `<output_folder>/<job_id>/montage_output_<job_id>.mp4`
    pub fn output_path_for(output_folder: &Path, job_id: &str) -> PathBuf {
        output_folder
            .join(job_id)
            .join(format!("montage_output_{}.mp4", job_id))
    }
}

pub(crate) fn short_id(job_id: &str) -> &str {
    job_id.get(..8).unwrap_or(job_id)
}
