//! Marker (beat label) file parsing.
//!
//! Label files are newline-delimited records with TAB-separated fields.
//! Only field 0, the event start time in seconds, is used.

use std::fs;
use std::path::Path;

use crate::error::{MontageError, MontageResult};

/// Field separator in label files.
pub const MARKER_FIELD_SEPARATOR: char = '\t';

/// A label line that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the file.
    pub line_number: usize,
    pub content: String,
}

/// Result of parsing a label file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    /// Strictly increasing beat timestamps, seconds.
    pub beats: Vec<f64>,
    /// Lines whose first field was not a usable timestamp.
    pub skipped: Vec<SkippedLine>,
}

impl MarkerSet {
    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }
}

/// Parse label text into a sorted, duplicate-free beat sequence.
///
/// Blank lines are ignored. Lines whose first field is not a finite,
/// non-negative number are reported in `skipped`; parsing never fails.
pub fn parse_markers(text: &str) -> MarkerSet {
    let mut beats = Vec::new();
    let mut skipped = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let first = line.split(MARKER_FIELD_SEPARATOR).next().unwrap_or("").trim();
        match first.parse::<f64>() {
            Ok(ts) if ts.is_finite() && ts >= 0.0 => beats.push(ts),
            _ => skipped.push(SkippedLine {
                line_number: idx + 1,
                content: line.to_string(),
            }),
        }
    }

    beats.sort_by(|a, b| a.total_cmp(b));
    beats.dedup();

    MarkerSet { beats, skipped }
}

/// Read and parse a label file.
///
/// A missing file is an `InputNotFound` error; an empty file yields an
/// empty `MarkerSet`.
pub fn load_markers(path: &Path) -> MontageResult<MarkerSet> {
    if !path.exists() {
        return Err(MontageError::input_not_found("Label file", path));
    }

    let text = fs::read_to_string(path)
        .map_err(|e| MontageError::io(format!("reading label file {}", path.display()), e))?;

    let markers = parse_markers(&text);
    tracing::debug!(
        "Parsed {} beats ({} skipped lines) from {}",
        markers.beats.len(),
        markers.skipped.len(),
        path.display()
    );
    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn drops_duplicates_and_bad_lines() {
        let text = ["1.0\tfoo", "bad\t", "", "2.5\tbar", "1.0\tdup"].join("\n");
        let markers = parse_markers(&text);

        assert_eq!(markers.beats, vec![1.0, 2.5]);
        assert_eq!(markers.skipped.len(), 1);
        assert_eq!(markers.skipped[0].line_number, 2);
        assert_eq!(markers.skipped[0].content, "bad");
    }

    #[test]
    fn sorts_out_of_order_labels() {
        let markers = parse_markers("3.0\t3.0\tc\n0.5\t0.5\ta\n1.25\t1.25\tb\n");
        assert_eq!(markers.beats, vec![0.5, 1.25, 3.0]);
        assert!(markers.skipped.is_empty());
    }

    #[test]
    fn rejects_negative_and_non_finite() {
        let markers = parse_markers("-1.0\tx\nnan\ty\ninf\tz\n2.0\tok\n");
        assert_eq!(markers.beats, vec![2.0]);
        assert_eq!(markers.skipped.len(), 3);
    }

    #[test]
    fn handles_crlf_and_single_field_lines() {
        let markers = parse_markers("0.75\r\n1.5\tlabel\r\n");
        assert_eq!(markers.beats, vec![0.75, 1.5]);
    }

    #[test]
    fn empty_text_is_empty_set() {
        assert!(parse_markers("").is_empty());
        assert!(parse_markers("\n\n  \n").is_empty());
    }

    #[test]
    fn load_missing_file_is_input_not_found() {
        let dir = tempdir().unwrap();
        let err = load_markers(&dir.path().join("labels.txt")).unwrap_err();
        assert_eq!(err.kind(), "input_not_found");
    }

    #[test]
    fn load_empty_file_is_recoverable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        fs::write(&path, "").unwrap();

        let markers = load_markers(&path).unwrap();
        assert!(markers.is_empty());
    }
}
