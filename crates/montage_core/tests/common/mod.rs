//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use montage_core::config::Settings;
use montage_core::jobs::{InMemoryJobStore, JobStore, MontageRequest, MontageService, SourceRef};
use montage_core::logging::init_test_tracing;
use montage_core::media::RecordingRunner;
use montage_core::orchestrator::{JobResult, WORK_AREA_PREFIX};

/// A sandbox with its own output, temp, log and library folders.
pub struct Sandbox {
    pub dir: TempDir,
    pub settings: Settings,
}

impl Sandbox {
    pub fn new() -> Self {
        init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let mut settings = Settings::default();
        settings.paths.output_folder = root.join("outputs").display().to_string();
        settings.paths.temp_root = root.join("tmp").display().to_string();
        settings.paths.logs_folder = root.join("logs").display().to_string();
        settings.paths.library_folder = root.join("library").display().to_string();
        settings.paths.downloads_folder = root.join("tmp").join("downloads").display().to_string();
        settings.render.seed = Some(42);
        Self { dir, settings }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// A source video placeholder (the fake runner never reads it).
    pub fn video(&self, name: &str) -> PathBuf {
        self.write(name, "video")
    }

    /// A label file with one beat per line.
    pub fn markers(&self, name: &str, beats: &[f64]) -> PathBuf {
        let text: String = beats
            .iter()
            .enumerate()
            .map(|(i, b)| format!("{:.6}\t{:.6}\tbeat{}\n", b, b, i + 1))
            .collect();
        self.write(name, &text)
    }

    pub fn local_request(&self, video: &Path, markers: &Path) -> MontageRequest {
        MontageRequest::new(SourceRef::Local(video.to_path_buf()), markers)
    }

    /// Submit one request and wait for it.
    pub fn run(&self, runner: Arc<RecordingRunner>, request: MontageRequest) -> Finished {
        let store = Arc::new(InMemoryJobStore::new());
        let service = MontageService::new(
            Arc::new(self.settings.clone()),
            runner.clone(),
            store.clone(),
        );
        let job = service.submit(request).unwrap();
        let job_id = job.job_id.clone();
        let result = job.wait().expect("worker panicked");
        Finished {
            job_id,
            result,
            store,
            runner,
        }
    }

    /// Work areas still present under the temp root.
    pub fn leftover_work_areas(&self) -> Vec<PathBuf> {
        let root = Path::new(&self.settings.paths.temp_root);
        let Ok(entries) = fs::read_dir(root) else {
            return Vec::new();
        };
        entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().starts_with(WORK_AREA_PREFIX))
                    .unwrap_or(false)
            })
            .collect()
    }
}

pub struct Finished {
    pub job_id: String,
    pub result: JobResult,
    pub store: Arc<InMemoryJobStore>,
    pub runner: Arc<RecordingRunner>,
}

impl Finished {
    pub fn messages(&self) -> Vec<String> {
        self.store
            .history(&self.job_id)
            .into_iter()
            .map(|r| r.event.message)
            .collect()
    }

    pub fn terminal(&self) -> montage_core::models::ProgressEvent {
        self.store.latest(&self.job_id).expect("job has no events")
    }

    /// `-ss` offsets of every extraction call, in order.
    pub fn extraction_offsets(&self) -> Vec<String> {
        self.runner
            .invocations_of("ffmpeg")
            .iter()
            .filter_map(|c| c.arg_after("-ss").map(str::to_string))
            .collect()
    }
}
