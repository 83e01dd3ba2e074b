//! ffmpeg / ffprobe argument builders.
//!
//! Builders return argument tokens (without the program name) so they can
//! be logged, recorded and passed to a [`CommandRunner`](super::CommandRunner)
//! unchanged.

use std::path::Path;

use crate::config::RenderSettings;
use crate::models::{AudioMixMode, ClipSpec, Resolution};

/// Filter that scales into the target box keeping aspect ratio, pads with
/// black to the exact size and resets the sample aspect ratio.
pub fn scale_pad_filter(resolution: Resolution) -> String {
    let Resolution { width, height } = resolution;
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1",
        w = width,
        h = height
    )
}

/// Seconds as passed to `-ss` / `-t`.
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// ffprobe arguments printing the container format section as JSON.
pub fn probe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        path_arg(path),
    ]
}

/// Builds the ffmpeg call that cuts one clip into a normalized intermediate.
///
/// Every intermediate gets the same codec, resolution, sample rate and audio
/// bitrate so the concatenation step can stream-copy.
pub struct ExtractCommandBuilder<'a> {
    render: &'a RenderSettings,
    source: &'a Path,
    clip: &'a ClipSpec,
    resolution: Resolution,
    output: &'a Path,
}

impl<'a> ExtractCommandBuilder<'a> {
    pub fn new(
        render: &'a RenderSettings,
        source: &'a Path,
        clip: &'a ClipSpec,
        resolution: Resolution,
        output: &'a Path,
    ) -> Self {
        Self {
            render,
            source,
            clip,
            resolution,
            output,
        }
    }

    pub fn build(&self) -> Vec<String> {
        let mut tokens = Vec::new();

        // Input seek before -i for fast keyframe seeking.
        tokens.push("-ss".to_string());
        tokens.push(format_seconds(self.clip.source_start));
        tokens.push("-i".to_string());
        tokens.push(path_arg(self.source));
        tokens.push("-t".to_string());
        tokens.push(format_seconds(self.clip.duration));

        tokens.push("-vf".to_string());
        tokens.push(scale_pad_filter(self.resolution));

        self.add_encoder_options(&mut tokens);

        tokens.push("-y".to_string());
        tokens.push(path_arg(self.output));
        tokens
    }

    fn add_encoder_options(&self, tokens: &mut Vec<String>) {
        let render = self.render;
        tokens.extend([
            "-c:v".to_string(),
            render.video_codec.clone(),
            "-preset".to_string(),
            render.preset.clone(),
            "-crf".to_string(),
            render.crf.to_string(),
            "-c:a".to_string(),
            render.audio_codec.clone(),
            "-b:a".to_string(),
            render.clip_audio_bitrate.clone(),
            "-ar".to_string(),
            render.audio_sample_rate.to_string(),
            "-threads".to_string(),
            render.threads.to_string(),
        ]);
    }
}

/// Builds the final ffmpeg call: concatenate intermediates from a manifest
/// and optionally replace or mix the audio track.
pub struct AssembleCommandBuilder<'a> {
    render: &'a RenderSettings,
    manifest: &'a Path,
    external_audio: Option<(&'a Path, AudioMixMode)>,
    output: &'a Path,
}

impl<'a> AssembleCommandBuilder<'a> {
    pub fn new(render: &'a RenderSettings, manifest: &'a Path, output: &'a Path) -> Self {
        Self {
            render,
            manifest,
            external_audio: None,
            output,
        }
    }

    pub fn external_audio(mut self, audio: &'a Path, mode: AudioMixMode) -> Self {
        self.external_audio = Some((audio, mode));
        self
    }

    pub fn build(&self) -> Vec<String> {
        let mut tokens = vec![
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            path_arg(self.manifest),
        ];

        match self.external_audio {
            None => {
                tokens.push("-c".to_string());
                tokens.push("copy".to_string());
            }
            Some((audio, mode)) => {
                tokens.push("-i".to_string());
                tokens.push(path_arg(audio));
                match mode {
                    AudioMixMode::Replace => self.add_replace_options(&mut tokens),
                    AudioMixMode::Mix => self.add_mix_options(&mut tokens),
                }
            }
        }

        tokens.push("-y".to_string());
        tokens.push(path_arg(self.output));
        tokens
    }

    /// Video from the concat input, audio from the external file, trimmed
    /// to the shorter of the two.
    fn add_replace_options(&self, tokens: &mut Vec<String>) {
        tokens.extend([
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
        ]);
        self.add_output_audio(tokens);
        tokens.push("-shortest".to_string());
    }

    /// Both audio tracks mixed; the video is re-encoded. Output length
    /// follows the concatenated clips.
    fn add_mix_options(&self, tokens: &mut Vec<String>) {
        let render = self.render;
        tokens.extend([
            "-filter_complex".to_string(),
            "[0:a][1:a]amix=inputs=2:duration=first:dropout_transition=3[aout]".to_string(),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "[aout]".to_string(),
            "-c:v".to_string(),
            render.video_codec.clone(),
            "-preset".to_string(),
            render.preset.clone(),
            "-crf".to_string(),
            render.mix_crf.to_string(),
        ]);
        self.add_output_audio(tokens);
    }

    fn add_output_audio(&self, tokens: &mut Vec<String>) {
        let render = self.render;
        tokens.extend([
            "-c:a".to_string(),
            render.audio_codec.clone(),
            "-b:a".to_string(),
            render.output_audio_bitrate.clone(),
            "-ar".to_string(),
            render.audio_sample_rate.to_string(),
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn joined(tokens: &[String]) -> String {
        tokens.join(" ")
    }

    #[test]
    fn extract_command_tokens() {
        let render = RenderSettings::default();
        let clip = ClipSpec {
            source_start: 4.25,
            duration: 1.5,
            sequence_index: 2,
        };
        let source = PathBuf::from("/videos/in.mp4");
        let output = PathBuf::from("/tmp/w/scene_002.mp4");
        let tokens = ExtractCommandBuilder::new(
            &render,
            &source,
            &clip,
            Resolution::new(1280, 720),
            &output,
        )
        .build();

        assert_eq!(
            joined(&tokens),
            "-ss 4.250 -i /videos/in.mp4 -t 1.500 \
             -vf scale=1280:720:force_original_aspect_ratio=decrease,\
             pad=1280:720:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1 \
             -c:v libx264 -preset ultrafast -crf 23 -c:a aac -b:a 128k -ar 44100 \
             -threads 0 -y /tmp/w/scene_002.mp4"
        );
    }

    #[test]
    fn assemble_without_audio_copies_streams() {
        let render = RenderSettings::default();
        let manifest = PathBuf::from("/tmp/w/concat_list.txt");
        let output = PathBuf::from("/out/montage.mp4");
        let tokens = AssembleCommandBuilder::new(&render, &manifest, &output).build();

        assert_eq!(
            joined(&tokens),
            "-f concat -safe 0 -i /tmp/w/concat_list.txt -c copy -y /out/montage.mp4"
        );
    }

    #[test]
    fn assemble_replace_maps_external_audio() {
        let render = RenderSettings::default();
        let manifest = PathBuf::from("list.txt");
        let audio = PathBuf::from("song.mp3");
        let output = PathBuf::from("out.mp4");
        let tokens = AssembleCommandBuilder::new(&render, &manifest, &output)
            .external_audio(&audio, AudioMixMode::Replace)
            .build();

        let line = joined(&tokens);
        assert!(line.contains("-i list.txt -i song.mp3 -map 0:v:0 -map 1:a:0 -c:v copy"));
        assert!(line.contains("-c:a aac -b:a 192k -ar 44100 -shortest -y out.mp4"));
        assert!(!line.contains("amix"));
    }

    #[test]
    fn assemble_mix_reencodes_video() {
        let render = RenderSettings::default();
        let manifest = PathBuf::from("list.txt");
        let audio = PathBuf::from("song.mp3");
        let output = PathBuf::from("out.mp4");
        let tokens = AssembleCommandBuilder::new(&render, &manifest, &output)
            .external_audio(&audio, AudioMixMode::Mix)
            .build();

        let line = joined(&tokens);
        assert!(line.contains("[0:a][1:a]amix=inputs=2:duration=first:dropout_transition=3[aout]"));
        assert!(line.contains("-map [aout] -c:v libx264 -preset ultrafast -crf 22"));
        assert!(!line.contains("-shortest"));
    }

    #[test]
    fn probe_args_end_with_path() {
        let args = probe_args(Path::new("/v/a.mp4"));
        assert_eq!(args.last().map(String::as_str), Some("/v/a.mp4"));
        assert!(args.contains(&"-show_format".to_string()));
    }
}
