//! Concat demuxer manifest.
//!
//! One `file '<name>'` line per intermediate, in playback order. Names are
//! written relative to the manifest's directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MontageError, MontageResult};

pub const MANIFEST_FILE_NAME: &str = "concat_list.txt";

/// Quote a path for the concat demuxer (`'` becomes `'\''`).
fn quote_entry(name: &str) -> String {
    format!("'{}'", name.replace('\'', "'\\''"))
}

/// Render manifest text for `clips`.
///
/// Entries inside `base_dir` are written relative to it; anything else is
/// written as given.
pub fn render_manifest(base_dir: &Path, clips: &[PathBuf]) -> String {
    let mut out = String::new();
    for clip in clips {
        let entry = clip.strip_prefix(base_dir).unwrap_or(clip);
        out.push_str("file ");
        out.push_str(&quote_entry(&entry.to_string_lossy()));
        out.push('\n');
    }
    out
}

/// Write the manifest into `work_dir` and return its path.
pub fn write_manifest(work_dir: &Path, clips: &[PathBuf]) -> MontageResult<PathBuf> {
    let path = work_dir.join(MANIFEST_FILE_NAME);
    fs::write(&path, render_manifest(work_dir, clips))
        .map_err(|e| MontageError::io("writing concat manifest", e))?;
    tracing::debug!("Wrote concat manifest with {} entries", clips.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn entries_are_relative_and_ordered() {
        let base = Path::new("/tmp/work");
        let clips = vec![base.join("scene_000.mp4"), base.join("scene_001.mp4")];
        assert_eq!(
            render_manifest(base, &clips),
            "file 'scene_000.mp4'\nfile 'scene_001.mp4'\n"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        let clips = vec![PathBuf::from("/elsewhere/it's.mp4")];
        assert_eq!(
            render_manifest(Path::new("/tmp/work"), &clips),
            "file '/elsewhere/it'\\''s.mp4'\n"
        );
    }

    #[test]
    fn writes_into_work_dir() {
        let dir = tempdir().unwrap();
        let clips = vec![dir.path().join("scene_000.mp4")];
        let path = write_manifest(dir.path(), &clips).unwrap();

        assert_eq!(path, dir.path().join(MANIFEST_FILE_NAME));
        assert_eq!(fs::read_to_string(path).unwrap(), "file 'scene_000.mp4'\n");
    }
}
