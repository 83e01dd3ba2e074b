//! Command runner for external process execution.
//!
//! All external tools go through the [`CommandRunner`] trait so the render
//! pipeline can be driven by [`RecordingRunner`] in tests.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use parking_lot::Mutex;

/// Captured result of one external invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external programs.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion, capturing its output.
    ///
    /// An `io::ErrorKind::NotFound` error means the program does not exist.
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;

    /// Whether `program` can be found (on PATH or as a path).
    fn is_available(&self, program: &str) -> bool;
}

/// Runs real processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// One recorded call to [`RecordingRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }

    /// Value following `flag`, e.g. `-t` -> duration.
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn is_probe(&self) -> bool {
        self.has_arg("-show_format")
    }
}

struct FailureRule {
    program: String,
    arg_contains: String,
    stderr: String,
}

/// In-process stand-in for ffmpeg, ffprobe and the downloader.
///
/// - Probe calls (`-show_format`) answer with ffprobe-style JSON using the
///   duration registered for the probed path, or the default duration.
/// - Other calls create the file named by their last argument, or for a
///   downloader `-o <dir>/template` create `<dir>/download.mp4`.
/// - Calls matching a failure rule exit with code 1 and the rule's stderr.
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    unavailable: Mutex<HashSet<String>>,
    failures: Mutex<Vec<FailureRule>>,
    durations: Mutex<HashMap<PathBuf, f64>>,
    default_duration: Mutex<Option<f64>>,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            unavailable: Mutex::new(HashSet::new()),
            failures: Mutex::new(Vec::new()),
            durations: Mutex::new(HashMap::new()),
            default_duration: Mutex::new(None),
        }
    }

    /// Probe answer for a specific path.
    pub fn with_duration(self, path: impl Into<PathBuf>, seconds: f64) -> Self {
        self.durations.lock().insert(path.into(), seconds);
        self
    }

    /// Probe answer for any path without a specific entry.
    pub fn with_default_duration(self, seconds: f64) -> Self {
        *self.default_duration.lock() = Some(seconds);
        self
    }

    /// Report `program` as missing from PATH; running it yields `NotFound`.
    pub fn without_program(self, program: impl Into<String>) -> Self {
        self.unavailable.lock().insert(program.into());
        self
    }

    /// Fail calls to `program` having an argument containing `arg_contains`.
    pub fn fail_when(
        self,
        program: impl Into<String>,
        arg_contains: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        self.failures.lock().push(FailureRule {
            program: program.into(),
            arg_contains: arg_contains.into(),
            stderr: stderr.into(),
        });
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    pub fn invocations_of(&self, program: &str) -> Vec<Invocation> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }

    fn probe_response(&self, args: &[String]) -> CommandOutput {
        let path = args.last().map(PathBuf::from).unwrap_or_default();
        let duration = self
            .durations
            .lock()
            .get(&path)
            .copied()
            .or(*self.default_duration.lock());

        let stdout = match duration {
            Some(seconds) => serde_json::json!({
                "format": {
                    "filename": path.to_string_lossy(),
                    "duration": format!("{:.6}", seconds),
                }
            })
            .to_string(),
            None => serde_json::json!({ "format": {} }).to_string(),
        };

        CommandOutput {
            exit_code: Some(0),
            stdout,
            stderr: String::new(),
        }
    }

    fn produce_output(&self, args: &[String]) -> io::Result<()> {
        let template = args
            .iter()
            .position(|a| a == "-o")
            .and_then(|i| args.get(i + 1));

        let target = match template {
            Some(template) => Path::new(template)
                .parent()
                .map(|dir| dir.join("download.mp4")),
            None => args.last().map(PathBuf::from),
        };

        if let Some(target) = target {
            if let Some(parent) = target.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&target, b"recorded")?;
        }
        Ok(())
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        };
        self.calls.lock().push(invocation.clone());

        if self.unavailable.lock().contains(program) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", program),
            ));
        }

        let failure = self
            .failures
            .lock()
            .iter()
            .find(|rule| {
                rule.program == program && args.iter().any(|a| a.contains(&rule.arg_contains))
            })
            .map(|rule| rule.stderr.clone());
        if let Some(stderr) = failure {
            return Ok(CommandOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr,
            });
        }

        if invocation.is_probe() {
            return Ok(self.probe_response(args));
        }

        self.produce_output(args)?;
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }

    fn is_available(&self, program: &str) -> bool {
        !self.unavailable.lock().contains(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recording_runner_answers_probe() {
        let runner = RecordingRunner::new()
            .with_duration("/videos/a.mp4", 12.5)
            .with_default_duration(3.0);

        let out = runner
            .run("ffprobe", &args(&["-show_format", "/videos/a.mp4"]))
            .unwrap();
        assert!(out.success());
        assert!(out.stdout.contains("12.500000"));

        let other = runner
            .run("ffprobe", &args(&["-show_format", "/videos/b.mp4"]))
            .unwrap();
        assert!(other.stdout.contains("3.000000"));
    }

    #[test]
    fn recording_runner_creates_output_file() {
        let dir = tempdir().unwrap();
        let out_path = dir.path().join("scene_000.mp4");
        let runner = RecordingRunner::new();

        runner
            .run("ffmpeg", &args(&["-y", out_path.to_str().unwrap()]))
            .unwrap();
        assert!(out_path.exists());
        assert_eq!(runner.invocations_of("ffmpeg").len(), 1);
    }

    #[test]
    fn recording_runner_download_template() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("%(title)s.%(ext)s");
        let runner = RecordingRunner::new();

        runner
            .run(
                "yt-dlp",
                &args(&["-o", template.to_str().unwrap(), "https://example.com/v"]),
            )
            .unwrap();
        assert!(dir.path().join("download.mp4").exists());
    }

    #[test]
    fn recording_runner_failure_and_unavailable() {
        let runner = RecordingRunner::new()
            .fail_when("ffmpeg", "scene_001", "Invalid data found")
            .without_program("yt-dlp");

        let out = runner
            .run("ffmpeg", &args(&["-y", "/nonexistent/dir/scene_001.mp4"]))
            .unwrap();
        assert_eq!(out.exit_code, Some(1));
        assert_eq!(out.stderr, "Invalid data found");

        let err = runner.run("yt-dlp", &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!runner.is_available("yt-dlp"));
        assert!(runner.is_available("ffmpeg"));
        assert_eq!(runner.invocations().len(), 2);
    }

    #[test]
    fn invocation_helpers() {
        let inv = Invocation {
            program: "ffmpeg".to_string(),
            args: args(&["-ss", "1.000", "-t", "2.500"]),
        };
        assert_eq!(inv.arg_after("-t"), Some("2.500"));
        assert!(inv.has_arg("-ss"));
        assert!(!inv.is_probe());
    }
}
