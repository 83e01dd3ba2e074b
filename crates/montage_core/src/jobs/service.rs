//! Job submission boundary.
//!
//! `MontageService` is what a request layer talks to: it assigns job ids,
//! starts one worker thread per job and answers status lookups from the
//! job store.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::Settings;
use crate::error::{MontageError, MontageResult};
use crate::logging::LogCallback;
use crate::media::CommandRunner;
use crate::models::ProgressEvent;
use crate::orchestrator::{JobResult, RenderProcessor};

use super::store::{JobStore, ProgressSink};
use super::types::{short_id, MontageRequest};

/// Receives every job log line together with the job id.
pub type LogListener = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// A job that has been accepted and started.
///
/// Dropping it detaches the worker; the job still runs to completion.
pub struct SubmittedJob {
    pub job_id: String,
    handle: Option<JoinHandle<JobResult>>,
}

impl SubmittedJob {
    /// Block until the worker finishes. `None` if the worker panicked.
    pub fn wait(mut self) -> Option<JobResult> {
        self.handle.take().and_then(|h| h.join().ok())
    }

    /// Whether the worker thread has exited, normally or by panic.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

/// Starts montage jobs and reports their status.
pub struct MontageService {
    settings: Arc<Settings>,
    runner: Arc<dyn CommandRunner>,
    store: Arc<dyn JobStore>,
    log_listener: Option<LogListener>,
}

impl MontageService {
    pub fn new(
        settings: Arc<Settings>,
        runner: Arc<dyn CommandRunner>,
        store: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            settings,
            runner,
            store,
            log_listener: None,
        }
    }

    /// Forward job log lines to `listener` (e.g. a terminal).
    pub fn with_log_listener(mut self, listener: LogListener) -> Self {
        self.log_listener = Some(listener);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Accept a request and start rendering it on its own thread.
    ///
    /// The job is `queued` in the store before this returns; everything
    /// else, including option errors, is reported through the store.
    pub fn submit(&self, request: MontageRequest) -> MontageResult<SubmittedJob> {
        let job_id = uuid::Uuid::new_v4().to_string();
        self.store
            .report(&job_id, ProgressEvent::queued("Job queued for processing"));
        tracing::info!(job_id = %job_id, source = %request.source.describe(), "Job submitted");

        let sink: Arc<dyn ProgressSink> = Arc::new(StoreSink(Arc::clone(&self.store)));
        let processor =
            RenderProcessor::new(Arc::clone(&self.settings), Arc::clone(&self.runner), sink);
        let callback = self.log_listener.as_ref().map(|listener| {
            let listener = Arc::clone(listener);
            let id = job_id.clone();
            Box::new(move |line: &str| listener(&id, line)) as LogCallback
        });

        let worker_id = job_id.clone();
        let spawned = thread::Builder::new()
            .name(format!("montage-{}", short_id(&job_id)))
            .spawn(move || processor.process(&worker_id, &request, callback));

        match spawned {
            Ok(handle) => Ok(SubmittedJob {
                job_id,
                handle: Some(handle),
            }),
            Err(e) => {
                let err = MontageError::io("starting job worker", e);
                self.store
                    .report(&job_id, ProgressEvent::error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Latest event for a job, `None` if unknown or purged.
    pub fn status(&self, job_id: &str) -> Option<ProgressEvent> {
        self.store.latest(job_id)
    }

    /// Remove a job's output folder and forget it.
    ///
    /// Returns whether anything was removed.
    pub fn purge(&self, job_id: &str) -> MontageResult<bool> {
        if !is_valid_job_id(job_id) {
            return Err(MontageError::invalid_option(
                "job_id",
                format!("'{}' is not a job id", job_id),
            ));
        }

        let folder = Path::new(&self.settings.paths.output_folder).join(job_id);
        let mut removed = false;
        if folder.is_dir() {
            fs::remove_dir_all(&folder)
                .map_err(|e| MontageError::io(format!("removing {}", folder.display()), e))?;
            removed = true;
        }
        removed |= self.store.remove(job_id);
        if removed {
            tracing::info!(job_id, "Job purged");
        }
        Ok(removed)
    }
}

/// Ids are joined onto the output folder; nothing path-like is accepted.
fn is_valid_job_id(job_id: &str) -> bool {
    !job_id.is_empty()
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Adapts the shared store to the processor's sink.
struct StoreSink(Arc<dyn JobStore>);

impl ProgressSink for StoreSink {
    fn report(&self, job_id: &str, event: ProgressEvent) {
        self.0.report(job_id, event);
    }
}
