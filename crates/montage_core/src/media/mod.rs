//! External media tools: command runner, ffmpeg argument builders, concat
//! manifest and duration probing.

mod commands;
mod manifest;
mod probe;
pub mod runner;

pub use commands::{
    format_seconds, probe_args, scale_pad_filter, AssembleCommandBuilder, ExtractCommandBuilder,
};
pub use manifest::{render_manifest, write_manifest, MANIFEST_FILE_NAME};
pub use probe::{parse_duration, probe_duration};
pub use runner::{CommandOutput, CommandRunner, Invocation, RecordingRunner, SystemRunner};

use std::io;

use crate::error::{MontageError, MontageResult};
use crate::logging::JobLogger;

/// Stderr lines kept in an `ExternalToolFailure` diagnostic.
const DIAGNOSTIC_LINES: usize = 10;

/// Run one external command through `runner` with job logging.
///
/// The command line is logged first and every output line lands in the
/// logger's tail buffer. A missing program maps to `ToolUnavailable`; a
/// non-zero exit maps to `ExternalToolFailure` carrying `operation` and
/// the last stderr lines.
pub fn invoke(
    runner: &dyn CommandRunner,
    logger: &JobLogger,
    program: &str,
    args: &[String],
    operation: &str,
) -> MontageResult<CommandOutput> {
    logger.command(program, args);

    let output = runner.run(program, args).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MontageError::tool_unavailable(program),
        _ => MontageError::io(format!("running {} for {}", program, operation), e),
    })?;

    for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
        logger.output_line(line, false);
    }
    for line in output.stderr.lines().filter(|l| !l.trim().is_empty()) {
        logger.output_line(line, true);
    }

    if !output.success() {
        logger.show_tail(program);
        return Err(MontageError::tool_failure(
            operation,
            output.exit_code,
            diagnostic_tail(&output.stderr, DIAGNOSTIC_LINES),
        ));
    }

    Ok(output)
}

/// Fail with `ToolUnavailable` unless `program` can be found.
pub fn require_tool(runner: &dyn CommandRunner, program: &str) -> MontageResult<()> {
    if runner.is_available(program) {
        Ok(())
    } else {
        Err(MontageError::tool_unavailable(program))
    }
}

/// Last `max_lines` non-empty lines of tool output.
pub fn diagnostic_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return "no diagnostic output".to_string();
    }
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
