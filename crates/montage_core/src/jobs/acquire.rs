//! Source video resolution: library lookup, remote download, and the file
//! kinds accepted at the request boundary.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MontageError, MontageResult};
use crate::logging::JobLogger;
use crate::media::{self, CommandRunner};

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "ogg", "flac"];
pub const MARKER_EXTENSIONS: &[&str] = &["txt"];

/// Downloader diagnostics are cut to this many characters.
const DOWNLOAD_DIAGNOSTIC_LIMIT: usize = 500;

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Sorted names of video files directly inside `library_dir`.
///
/// A missing folder is an empty library.
pub fn list_library_videos(library_dir: &Path) -> MontageResult<Vec<String>> {
    if !library_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(library_dir)
        .map_err(|e| MontageError::io(format!("listing {}", library_dir.display()), e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| MontageError::io(format!("listing {}", library_dir.display()), e))?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, VIDEO_EXTENSIONS) {
            if let Some(name) = path.file_name() {
                names.push(name.to_string_lossy().into_owned());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Path of a library video. Only the final component of `name` is used, so
/// a request cannot reach outside the library folder.
pub fn resolve_library_video(library_dir: &Path, name: &str) -> MontageResult<PathBuf> {
    let file_name = Path::new(name)
        .file_name()
        .ok_or_else(|| MontageError::invalid_option("library video", format!("'{}'", name)))?;

    let path = library_dir.join(file_name);
    if !path.is_file() {
        return Err(MontageError::input_not_found("Library video", path));
    }
    Ok(path)
}

/// Downloader arguments fetching `url` into `dir` as mp4.
pub fn download_args(url: &str, dir: &Path) -> Vec<String> {
    vec![
        "-f".to_string(),
        "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best".to_string(),
        "--merge-output-format".to_string(),
        "mp4".to_string(),
        "-o".to_string(),
        dir.join("%(title)s.%(ext)s").to_string_lossy().into_owned(),
        url.to_string(),
    ]
}

/// Fetch a remote video into `dir` and return the downloaded file.
pub fn download_video(
    runner: &dyn CommandRunner,
    logger: &JobLogger,
    downloader: &str,
    url: &str,
    dir: &Path,
) -> MontageResult<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| MontageError::io(format!("creating download folder {}", dir.display()), e))?;

    media::invoke(
        runner,
        logger,
        downloader,
        &download_args(url, dir),
        "downloading source video",
    )
    .map_err(truncate_diagnostic)?;

    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| MontageError::io(format!("listing {}", dir.display()), e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_extension(p, VIDEO_EXTENSIONS))
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| MontageError::input_not_found("Downloaded video", dir))
}

fn truncate_diagnostic(err: MontageError) -> MontageError {
    match err {
        MontageError::ExternalToolFailure {
            operation,
            exit_code,
            diagnostic,
        } if diagnostic.chars().count() > DOWNLOAD_DIAGNOSTIC_LIMIT => {
            let cut: String = diagnostic.chars().take(DOWNLOAD_DIAGNOSTIC_LIMIT).collect();
            MontageError::tool_failure(operation, exit_code, cut)
        }
        other => other,
    }
}
