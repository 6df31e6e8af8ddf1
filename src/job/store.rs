use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::model::{Job, JobStatus};
use crate::error::{PipelineError, Result};

/// Progress hints published at each stage boundary. Advisory only — no
/// consumer relies on monotonicity within a range.
pub mod progress {
    pub const QUEUED: u8 = 0;
    pub const POST_HLS: u8 = 30;
    pub const POST_PLACEMENT: u8 = 60;
    pub const POST_SPLICE: u8 = 90;
    pub const COMPLETED: u8 = 100;
}

/// In-process job registry keyed by job id. Reads are short-lived (copy
/// the record out); `DashMap`'s per-shard locking keeps a single job's
/// read-then-transition atomic without a global lock. This crate ships
/// only the in-memory backend (no durable store is named in the spec) —
/// a durable implementation would sit behind the same `insert`/`get`/
/// `update` surface without touching call sites.
#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<DashMap<Uuid, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.jobs.insert(job.id, job);
    }

    pub fn get(&self, id: &Uuid) -> Option<Job> {
        self.jobs.get(id).map(|r| r.clone())
    }

    /// Apply `f` to the job under the shard lock, so the read-modify-write
    /// is atomic with respect to other updaters.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut Job)) -> bool {
        if let Some(mut entry) = self.jobs.get_mut(id) {
            f(&mut entry);
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> usize {
        self.jobs.len()
    }

    pub fn count_by_status(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|entry| entry.status == status).count()
    }

    /// Fetch a job and verify the caller owns it, in one step — the
    /// pattern every authenticated job-scoped handler needs.
    pub fn get_owned(&self, id: &Uuid, owner_id: &str) -> Result<Job> {
        let job = self.get(id).ok_or(PipelineError::JobNotFound)?;
        if job.owner_id != owner_id {
            return Err(PipelineError::Forbidden);
        }
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn get_owned_rejects_wrong_owner() {
        let store = JobStore::new();
        let id = Uuid::new_v4();
        store.insert(Job::new(id, "alice".to_string(), "/tmp/x".into(), Utc::now()));

        assert!(store.get_owned(&id, "alice").is_ok());
        let err = store.get_owned(&id, "bob").unwrap_err();
        assert_eq!(err.kind(), "forbidden");
    }

    #[test]
    fn get_owned_404s_on_unknown_job() {
        let store = JobStore::new();
        let err = store.get_owned(&Uuid::new_v4(), "alice").unwrap_err();
        assert_eq!(err.kind(), "not-found");
    }

    #[test]
    fn update_is_noop_on_missing_job() {
        let store = JobStore::new();
        assert!(!store.update(&Uuid::new_v4(), |j| j.progress_pct = 50));
    }
}
