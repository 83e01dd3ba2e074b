//! Progress sink and job store.
//!
//! The orchestrator only sees [`ProgressSink`]; status readers use the
//! [`JobStore`] side. Terminal states are absorbing: once a job reports
//! `completed` or `error`, later events for it are dropped.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::ProgressEvent;

/// Receives progress events, keyed by job id.
pub trait ProgressSink: Send + Sync {
    fn report(&self, job_id: &str, event: ProgressEvent);
}

/// An event as stored, with its store-wide sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub sequence: u64,
    pub event: ProgressEvent,
}

/// Progress sink that can also be read back.
pub trait JobStore: ProgressSink {
    /// Latest event for a job, `None` if unknown or purged.
    fn latest(&self, job_id: &str) -> Option<ProgressEvent>;

    /// Every accepted event for a job in report order.
    fn history(&self, job_id: &str) -> Vec<RecordedEvent>;

    /// Forget a job. Returns whether it was known.
    fn remove(&self, job_id: &str) -> bool;

    fn job_ids(&self) -> Vec<String>;
}

#[derive(Default)]
struct StoreInner {
    jobs: HashMap<String, Vec<RecordedEvent>>,
    next_sequence: u64,
}

/// Thread-safe in-process job store.
#[derive(Default)]
pub struct InMemoryJobStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for InMemoryJobStore {
    fn report(&self, job_id: &str, event: ProgressEvent) {
        let mut inner = self.inner.write();

        let terminal = inner
            .jobs
            .get(job_id)
            .and_then(|events| events.last())
            .map(|last| last.event.is_terminal())
            .unwrap_or(false);
        if terminal {
            tracing::warn!(
                job_id,
                status = %event.status,
                "Ignoring event after terminal state: {}",
                event.message
            );
            return;
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner
            .jobs
            .entry(job_id.to_string())
            .or_default()
            .push(RecordedEvent { sequence, event });
    }
}

impl JobStore for InMemoryJobStore {
    fn latest(&self, job_id: &str) -> Option<ProgressEvent> {
        self.inner
            .read()
            .jobs
            .get(job_id)
            .and_then(|events| events.last())
            .map(|r| r.event.clone())
    }

    fn history(&self, job_id: &str) -> Vec<RecordedEvent> {
        self.inner
            .read()
            .jobs
            .get(job_id)
            .cloned()
            .unwrap_or_default()
    }

    fn remove(&self, job_id: &str) -> bool {
        self.inner.write().jobs.remove(job_id).is_some()
    }

    fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.read().jobs.keys().cloned().collect();
        ids.sort();
        ids
    }
}
