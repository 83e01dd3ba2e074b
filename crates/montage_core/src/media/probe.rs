//! Media duration probing using `ffprobe -show_format`.

use std::path::Path;

use serde_json::Value;

use super::commands::probe_args;
use super::invoke;
use super::runner::CommandRunner;
use crate::error::{MontageError, MontageResult};
use crate::logging::JobLogger;

/// Read the container duration of `path` in seconds.
pub fn probe_duration(
    runner: &dyn CommandRunner,
    logger: &JobLogger,
    ffprobe: &str,
    path: &Path,
) -> MontageResult<f64> {
    let operation = format!("probing duration of {}", display_name(path));
    let output = invoke(runner, logger, ffprobe, &probe_args(path), &operation)?;

    parse_duration(&output.stdout).ok_or_else(|| {
        MontageError::tool_failure(
            operation,
            output.exit_code,
            "ffprobe reported no usable duration",
        )
    })
}

/// Extract `format.duration` from ffprobe JSON. ffprobe prints it as a
/// string; a bare number is accepted too.
pub fn parse_duration(json: &str) -> Option<f64> {
    let value: Value = serde_json::from_str(json).ok()?;
    let duration = value.get("format")?.get("duration")?;

    let seconds = match duration {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };

    (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
