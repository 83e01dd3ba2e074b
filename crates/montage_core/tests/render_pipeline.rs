//! End-to-end pipeline runs against the recording runner.

mod common;

use std::path::Path;
use std::sync::Arc;

use common::Sandbox;
use montage_core::jobs::{JobStore, MontageRequest, SourceRef};
use montage_core::media::RecordingRunner;
use montage_core::models::JobStatus;

const BEATS: &[f64] = &[1.0, 2.0, 3.0, 4.0];

fn runner_for(source: &Path, seconds: f64) -> Arc<RecordingRunner> {
    Arc::new(
        RecordingRunner::new()
            .with_duration(source, seconds)
            .with_default_duration(4.0),
    )
}

#[test]
fn renders_without_external_audio() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", BEATS);

    let run = sandbox.run(runner_for(&video, 60.0), sandbox.local_request(&video, &markers));

    assert!(run.result.success, "{:?}", run.result.error);
    let terminal = run.terminal();
    assert_eq!(terminal.status, JobStatus::Completed);
    assert_eq!(
        terminal.message,
        format!(
            "Output video created: montage_output_{}.mp4 (Duration: 4.00s)",
            run.job_id
        )
    );

    let output = terminal.output_file.unwrap();
    assert!(output.is_file());
    assert!(output.starts_with(&sandbox.settings.paths.output_folder));

    // Opening scene plus three beat scenes, then the concat call.
    let ffmpeg = run.runner.invocations_of("ffmpeg");
    assert_eq!(ffmpeg.len(), 5);
    let assemble = ffmpeg.last().unwrap();
    assert_eq!(assemble.arg_after("-f"), Some("concat"));
    assert_eq!(assemble.arg_after("-c"), Some("copy"));
    assert!(!assemble.has_arg("-shortest"));

    assert!(sandbox.leftover_work_areas().is_empty());
}

#[test]
fn replace_mode_maps_external_audio() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let audio = sandbox.write("song.mp3", "audio");
    let markers = sandbox.markers("beats.txt", BEATS);
    let request = sandbox
        .local_request(&video, &markers)
        .with_external_audio(&audio)
        .with_audio_mode("replace");

    let run = sandbox.run(runner_for(&video, 60.0), request);

    assert!(run.result.success, "{:?}", run.result.error);
    let ffmpeg = run.runner.invocations_of("ffmpeg");
    let assemble = ffmpeg.last().unwrap();
    assert!(assemble.has_arg("1:a:0"));
    assert!(assemble.has_arg("-shortest"));
    assert_eq!(assemble.arg_after("-c:v"), Some("copy"));
    assert_eq!(assemble.arg_after("-b:a"), Some("192k"));
}

#[test]
fn mix_mode_blends_both_tracks() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let audio = sandbox.write("song.wav", "audio");
    let markers = sandbox.markers("beats.txt", BEATS);
    let request = sandbox
        .local_request(&video, &markers)
        .with_external_audio(&audio)
        .with_audio_mode("mix");

    let run = sandbox.run(runner_for(&video, 60.0), request);

    assert!(run.result.success, "{:?}", run.result.error);
    let ffmpeg = run.runner.invocations_of("ffmpeg");
    let assemble = ffmpeg.last().unwrap();
    assert_eq!(
        assemble.arg_after("-filter_complex"),
        Some("[0:a][1:a]amix=inputs=2:duration=first:dropout_transition=3[aout]")
    );
    assert_eq!(assemble.arg_after("-crf"), Some("22"));
    assert!(!assemble.has_arg("-shortest"));
}

#[test]
fn extraction_failure_aborts_and_cleans_up() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", BEATS);
    let runner = Arc::new(
        RecordingRunner::new()
            .with_default_duration(60.0)
            .fail_when("ffmpeg", "scene_001.mp4", "Invalid data found when processing input"),
    );

    let run = sandbox.run(runner, sandbox.local_request(&video, &markers));

    assert!(!run.result.success);
    assert_eq!(run.result.error_kind, Some("external_tool_failure"));
    let terminal = run.terminal();
    assert_eq!(terminal.status, JobStatus::Error);
    assert!(terminal.message.contains("extracting scene 2"));
    assert!(terminal.message.contains("Invalid data found"));

    // No retries and nothing after the failed extraction.
    assert_eq!(run.runner.invocations_of("ffmpeg").len(), 2);
    assert!(sandbox.leftover_work_areas().is_empty());
}

#[test]
fn source_shorter_than_every_scene_is_an_empty_plan() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", &[0.0, 2.0, 4.0]);

    let run = sandbox.run(runner_for(&video, 0.5), sandbox.local_request(&video, &markers));

    assert_eq!(run.result.error_kind, Some("empty_plan"));
    assert_eq!(run.terminal().status, JobStatus::Error);
    assert!(run
        .messages()
        .iter()
        .any(|m| m.starts_with("Warning: Skipping scene 1")));
    // Probe only; nothing was extracted.
    assert!(run.runner.invocations_of("ffmpeg").is_empty());
    assert!(sandbox.leftover_work_areas().is_empty());
}

#[test]
fn missing_marker_file_is_input_not_found() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.path("nope.txt");

    let run = sandbox.run(runner_for(&video, 60.0), sandbox.local_request(&video, &markers));

    assert_eq!(run.result.error_kind, Some("input_not_found"));
    assert!(run.terminal().message.contains("nope.txt"));
    assert!(run.runner.invocations().is_empty());
}

#[test]
fn missing_source_video_is_input_not_found() {
    let sandbox = Sandbox::new();
    let markers = sandbox.markers("beats.txt", BEATS);
    let video = sandbox.path("gone.mp4");

    let run = sandbox.run(runner_for(&video, 60.0), sandbox.local_request(&video, &markers));

    assert_eq!(run.result.error_kind, Some("input_not_found"));
    assert!(run.runner.invocations().is_empty());
}

#[test]
fn invalid_resolution_fails_before_any_tool_runs() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", BEATS);
    let request = sandbox
        .local_request(&video, &markers)
        .with_resolution("wide");

    let run = sandbox.run(runner_for(&video, 60.0), request);

    assert_eq!(run.result.error_kind, Some("invalid_option"));
    assert_eq!(run.terminal().status, JobStatus::Error);
    assert!(run.runner.invocations().is_empty());
    assert!(sandbox.leftover_work_areas().is_empty());
}

#[test]
fn invalid_audio_mode_fails_before_any_tool_runs() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", BEATS);
    let request = sandbox
        .local_request(&video, &markers)
        .with_audio_mode("overlay");

    let run = sandbox.run(runner_for(&video, 60.0), request);

    assert_eq!(run.result.error_kind, Some("invalid_option"));
    assert!(run.runner.invocations().is_empty());
}

#[test]
fn missing_ffmpeg_is_tool_unavailable() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", BEATS);
    let runner = Arc::new(RecordingRunner::new().without_program("ffmpeg"));

    let run = sandbox.run(runner, sandbox.local_request(&video, &markers));

    assert_eq!(run.result.error_kind, Some("tool_unavailable"));
    assert!(run.terminal().message.contains("ffmpeg"));
}

#[test]
fn seeded_runs_draw_the_same_offsets() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", &[1.0, 2.5, 4.0, 5.5, 7.0]);

    let first = sandbox.run(runner_for(&video, 120.0), sandbox.local_request(&video, &markers));
    let second = sandbox.run(runner_for(&video, 120.0), sandbox.local_request(&video, &markers));

    assert!(first.result.success && second.result.success);
    let offsets = first.extraction_offsets();
    assert_eq!(offsets.len(), 5);
    assert_eq!(offsets, second.extraction_offsets());
}

#[test]
fn target_duration_truncates_final_scene() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", &[1.0, 3.0, 5.0, 7.0]);
    let request = sandbox
        .local_request(&video, &markers)
        .with_target_duration(4.0);

    let run = sandbox.run(runner_for(&video, 60.0), request);

    assert!(run.result.success, "{:?}", run.result.error);
    let lengths: Vec<String> = run
        .runner
        .invocations_of("ffmpeg")
        .iter()
        .filter_map(|c| c.arg_after("-t").map(str::to_string))
        .collect();
    // 1s opening, one full 2s scene, then the 1s remainder.
    assert_eq!(lengths, vec!["1.000", "2.000", "1.000"]);
}

#[test]
fn library_source_resolves_inside_library_folder() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("library/clip.mp4");
    let markers = sandbox.markers("beats.txt", BEATS);
    let request = MontageRequest::new(SourceRef::Library("clip.mp4".to_string()), &markers);

    let run = sandbox.run(runner_for(&video, 60.0), request);

    assert!(run.result.success, "{:?}", run.result.error);
    let probe = &run.runner.invocations_of("ffprobe")[0];
    assert_eq!(probe.args.last().map(String::as_str), video.to_str());
}

#[test]
fn unknown_library_video_is_input_not_found() {
    let sandbox = Sandbox::new();
    let markers = sandbox.markers("beats.txt", BEATS);
    let request = MontageRequest::new(SourceRef::Library("missing.mp4".to_string()), &markers);

    let run = sandbox.run(Arc::new(RecordingRunner::new()), request);

    assert_eq!(run.result.error_kind, Some("input_not_found"));
}

#[test]
fn url_source_is_downloaded_into_a_scoped_folder() {
    let sandbox = Sandbox::new();
    let markers = sandbox.markers("beats.txt", BEATS);
    let request = MontageRequest::new(
        SourceRef::Url("https://example.com/watch?v=abc".to_string()),
        &markers,
    );
    let runner = Arc::new(RecordingRunner::new().with_default_duration(60.0));

    let run = sandbox.run(runner, request);

    assert!(run.result.success, "{:?}", run.result.error);
    let downloads = run.runner.invocations_of("yt-dlp");
    assert_eq!(downloads.len(), 1);
    assert_eq!(
        downloads[0].args.last().map(String::as_str),
        Some("https://example.com/watch?v=abc")
    );

    let download_root = Path::new(&sandbox.settings.paths.downloads_folder);
    let remaining = std::fs::read_dir(download_root)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(remaining, 0);
}

#[test]
fn progress_ends_with_exactly_one_terminal_event() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", BEATS);

    let run = sandbox.run(runner_for(&video, 60.0), sandbox.local_request(&video, &markers));

    let history = run.store.history(&run.job_id);
    assert_eq!(history.first().unwrap().event.status, JobStatus::Queued);
    let terminal_count = history.iter().filter(|r| r.event.is_terminal()).count();
    assert_eq!(terminal_count, 1);
    assert!(history.last().unwrap().event.is_terminal());
    assert!(history.windows(2).all(|w| w[0].sequence < w[1].sequence));
}

#[test]
fn failed_output_check_still_completes() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", BEATS);
    let runner = Arc::new(
        RecordingRunner::new()
            .with_duration(&video, 60.0)
            .fail_when("ffprobe", "montage_output", "moov atom not found"),
    );

    let run = sandbox.run(runner, sandbox.local_request(&video, &markers));

    assert!(run.result.success, "{:?}", run.result.error);
    let terminal = run.terminal();
    assert_eq!(terminal.status, JobStatus::Completed);
    assert_eq!(
        terminal.message,
        format!("Output video created: montage_output_{}.mp4", run.job_id)
    );
    assert!(!terminal.message.contains("(Duration:"));
    assert!(terminal.output_file.unwrap().is_file());
    assert!(run
        .messages()
        .iter()
        .any(|m| m.starts_with("Warning: Verify skipped")));
}

#[test]
fn empty_marker_file_falls_back_to_single_scene() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.write("beats.txt", "");

    let run = sandbox.run(runner_for(&video, 3.0), sandbox.local_request(&video, &markers));

    assert!(run.result.success, "{:?}", run.result.error);
    assert_eq!(run.terminal().status, JobStatus::Completed);
    assert!(run
        .messages()
        .iter()
        .any(|m| m == "Warning: No valid beat timestamps found in label file"));

    let durations: Vec<String> = run
        .runner
        .invocations_of("ffmpeg")
        .iter()
        .filter_map(|c| c.arg_after("-t").map(str::to_string))
        .collect();
    assert_eq!(durations, vec!["3.000"]);
    assert_eq!(run.extraction_offsets(), vec!["0.000"]);
}

#[test]
fn oversized_beat_scenes_leave_only_clamped_opening() {
    let sandbox = Sandbox::new();
    let video = sandbox.video("in.mp4");
    let markers = sandbox.markers("beats.txt", &[5.0, 10.0, 15.0]);

    let run = sandbox.run(runner_for(&video, 2.0), sandbox.local_request(&video, &markers));

    assert!(run.result.success, "{:?}", run.result.error);
    assert_eq!(run.terminal().status, JobStatus::Completed);

    // Only the opening scene survives, cut down to the whole source.
    let durations: Vec<String> = run
        .runner
        .invocations_of("ffmpeg")
        .iter()
        .filter_map(|c| c.arg_after("-t").map(str::to_string))
        .collect();
    assert_eq!(durations, vec!["2.000"]);

    let messages = run.messages();
    for scene in [2, 3] {
        let prefix = format!("Warning: Skipping scene {}: duration (5.00s)", scene);
        assert!(
            messages.iter().any(|m| m.starts_with(&prefix)),
            "no skip warning for scene {}: {:?}",
            scene,
            messages
        );
    }
}
