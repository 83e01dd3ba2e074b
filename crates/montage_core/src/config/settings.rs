//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::models::AudioMixMode;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Encoder and planning constants.
    #[serde(default)]
    pub render: RenderSettings,

    /// Defaults for request fields the caller leaves out.
    #[serde(default)]
    pub defaults: RequestDefaults,
}

/// Path configuration for output, temp, logs and the video library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder; each job writes into `<output_folder>/<job_id>/`.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for per-job working areas.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Persistent videos that requests can reference by name.
    #[serde(default = "default_library_folder")]
    pub library_folder: String,

    /// Root for downloaded sources (one sub-folder per job).
    #[serde(default = "default_downloads_folder")]
    pub downloads_folder: String,
}

fn default_output_folder() -> String {
    "outputs".to_string()
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_library_folder() -> String {
    "server_videos".to_string()
}

fn default_downloads_folder() -> String {
    ".temp/downloads".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            library_folder: default_library_folder(),
            downloads_folder: default_downloads_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines to show after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Log every external command line before running it.
    #[serde(default = "default_true")]
    pub show_commands: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_commands: true,
        }
    }
}

/// Executable names or paths of the external tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    /// Remote video downloader (yt-dlp compatible command line).
    #[serde(default = "default_downloader")]
    pub downloader: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_downloader() -> String {
    "yt-dlp".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            downloader: default_downloader(),
        }
    }
}

/// Encoder settings and planning constants.
///
/// Intermediate clips all share codec, resolution, sample rate and audio
/// bitrate so the final concatenation can stream-copy them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    #[serde(default = "default_preset")]
    pub preset: String,

    /// Quality target for intermediate clips.
    #[serde(default = "default_crf")]
    pub crf: u32,

    /// Quality target when mixing audio forces a video re-encode.
    #[serde(default = "default_mix_crf")]
    pub mix_crf: u32,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    #[serde(default = "default_clip_audio_bitrate")]
    pub clip_audio_bitrate: String,

    #[serde(default = "default_output_audio_bitrate")]
    pub output_audio_bitrate: String,

    #[serde(default = "default_audio_sample_rate")]
    pub audio_sample_rate: u32,

    /// Encoder threads (0 = let ffmpeg decide).
    #[serde(default)]
    pub threads: u32,

    /// Opening scene length when the label file has no beats.
    #[serde(default = "default_fallback_scene_duration")]
    pub fallback_scene_duration: f64,

    /// Truncated final scenes must be longer than this, seconds.
    #[serde(default = "default_min_final_scene")]
    pub min_final_scene: f64,

    /// Fixed RNG seed for start offsets (unset = random per job).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

fn default_crf() -> u32 {
    23
}

fn default_mix_crf() -> u32 {
    22
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_clip_audio_bitrate() -> String {
    "128k".to_string()
}

fn default_output_audio_bitrate() -> String {
    "192k".to_string()
}

fn default_audio_sample_rate() -> u32 {
    44100
}

fn default_fallback_scene_duration() -> f64 {
    5.0
}

fn default_min_final_scene() -> f64 {
    0.1
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            video_codec: default_video_codec(),
            preset: default_preset(),
            crf: default_crf(),
            mix_crf: default_mix_crf(),
            audio_codec: default_audio_codec(),
            clip_audio_bitrate: default_clip_audio_bitrate(),
            output_audio_bitrate: default_output_audio_bitrate(),
            audio_sample_rate: default_audio_sample_rate(),
            threads: 0,
            fallback_scene_duration: default_fallback_scene_duration(),
            min_final_scene: default_min_final_scene(),
            seed: None,
        }
    }
}

/// Values used when a request leaves a field out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDefaults {
    #[serde(default = "default_resolution")]
    pub resolution: String,

    #[serde(default = "default_min_scene_duration")]
    pub min_scene_duration: f64,

    #[serde(default)]
    pub audio_mode: AudioMixMode,
}

fn default_resolution() -> String {
    "1280x720".to_string()
}

fn default_min_scene_duration() -> f64 {
    0.6
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            min_scene_duration: default_min_scene_duration(),
            audio_mode: AudioMixMode::default(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Tools,
    Render,
    Defaults,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Tools,
        ConfigSection::Render,
        ConfigSection::Defaults,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Tools => "tools",
            ConfigSection::Render => "render",
            ConfigSection::Defaults => "defaults",
        }
    }

    /// Comment written above the section in generated files.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output, working, log and library directories",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Tools => "External tool executables",
            ConfigSection::Render => "Encoder settings and planning constants",
            ConfigSection::Defaults => "Defaults for omitted request fields",
        }
    }
}
