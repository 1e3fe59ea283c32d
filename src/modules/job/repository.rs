use super::model::{Job, JobStatus};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

/// Process-local job store. Beyond the durable-store contract it owns the
/// state machine: transitions are one-directional, progress never decreases,
/// 100 is reached only through `complete`, and exactly one terminal cause
/// field ever gets set. Callers cannot put a record into an invalid state.
#[derive(Clone, Default)]
pub struct JobRepository {
    inner: Arc<JobStore>,
}

#[derive(Default)]
struct JobStore {
    rows: RwLock<HashMap<i64, Job>>,
    seq: AtomicI64,
}

impl JobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, mut job: Job) -> Job {
        job.id = self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1;
        job.status = JobStatus::Queued;
        job.progress = 0;
        job.output_path = None;
        job.error_message = None;
        let mut rows = self.inner.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.insert(job.id, job.clone());
        job
    }

    pub fn get(&self, id: i64) -> Option<Job> {
        let rows = self.inner.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.get(&id).cloned()
    }

    pub fn get_owned(&self, id: i64, owner: &str) -> Option<Job> {
        self.get(id).filter(|j| j.owner == owner)
    }

    pub fn list_by_owner(&self, owner: &str) -> Vec<Job> {
        let rows = self.inner.rows.read().unwrap_or_else(|e| e.into_inner());
        let mut jobs: Vec<Job> = rows.values().filter(|j| j.owner == owner).cloned().collect();
        jobs.sort_by(|a, b| b.id.cmp(&a.id));
        jobs
    }

    fn mutate<F>(&self, id: i64, f: F) -> bool
    where
        F: FnOnce(&mut Job) -> bool,
    {
        let mut rows = self.inner.rows.write().unwrap_or_else(|e| e.into_inner());
        match rows.get_mut(&id) {
            Some(job) => {
                let changed = f(job);
                if changed {
                    job.updated_at = OffsetDateTime::now_utc();
                }
                changed
            }
            None => false,
        }
    }

    /// Queued → Processing, the instant a worker claims the job.
    pub fn set_processing(&self, id: i64) -> bool {
        self.mutate(id, |job| {
            if job.status != JobStatus::Queued {
                return false;
            }
            job.status = JobStatus::Processing;
            true
        })
    }

    /// Progress write while processing. Regressions and values ≥ 100 are
    /// ignored; 100 is reserved for `complete`.
    pub fn set_progress(&self, id: i64, progress: u8) -> bool {
        self.mutate(id, |job| {
            if job.status != JobStatus::Processing {
                return false;
            }
            let progress = progress.min(99);
            if progress <= job.progress {
                return false;
            }
            job.progress = progress;
            true
        })
    }

    /// Processing → Completed: output recorded, progress forced to 100.
    pub fn complete(&self, id: i64, output_path: PathBuf) -> bool {
        self.mutate(id, |job| {
            if job.status != JobStatus::Processing {
                return false;
            }
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.output_path = Some(output_path);
            true
        })
    }

    /// Any non-terminal state → Failed; progress stays where it was.
    pub fn fail(&self, id: i64, error_message: String) -> bool {
        self.mutate(id, |job| {
            if job.status.is_terminal() {
                return false;
            }
            job.status = JobStatus::Failed;
            job.error_message = Some(error_message);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(owner: &str) -> Job {
        let now = OffsetDateTime::now_utc();
        Job {
            id: 0,
            asset_id: 1,
            owner: owner.to_string(),
            target_format: "mp4".into(),
            target_resolution: None,
            target_bitrate: None,
            target_fps: None,
            target_codec: None,
            quality: None,
            keep_audio: false,
            strip_metadata: false,
            status: JobStatus::Queued,
            progress: 0,
            output_path: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn lifecycle_reaches_completed_with_exclusive_output() {
        let repo = JobRepository::new();
        let created = repo.create(job("me"));
        assert_eq!(created.status, JobStatus::Queued);

        assert!(repo.set_processing(created.id));
        assert!(repo.set_progress(created.id, 30));
        assert!(repo.complete(created.id, "/out/1.mp4".into()));

        let done = repo.get(created.id).unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.progress, 100);
        assert!(done.output_path.is_some());
        assert!(done.error_message.is_none());
    }

    #[test]
    fn failure_keeps_progress_and_sets_only_error() {
        let repo = JobRepository::new();
        let created = repo.create(job("me"));
        repo.set_processing(created.id);
        repo.set_progress(created.id, 40);
        assert!(repo.fail(created.id, "boom".into()));

        let failed = repo.get(created.id).unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.progress, 40);
        assert!(failed.output_path.is_none());
        assert_eq!(failed.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn progress_is_monotonic_and_capped() {
        let repo = JobRepository::new();
        let created = repo.create(job("me"));
        repo.set_processing(created.id);

        assert!(repo.set_progress(created.id, 50));
        assert!(!repo.set_progress(created.id, 20));
        assert!(!repo.set_progress(created.id, 50));
        assert!(repo.set_progress(created.id, 120));
        assert_eq!(repo.get(created.id).unwrap().progress, 99);
    }

    #[test]
    fn terminal_states_are_final() {
        let repo = JobRepository::new();
        let created = repo.create(job("me"));
        repo.set_processing(created.id);
        repo.complete(created.id, "/out/1.mp4".into());

        assert!(!repo.fail(created.id, "late".into()));
        assert!(!repo.set_progress(created.id, 10));
        assert!(!repo.set_processing(created.id));

        let done = repo.get(created.id).unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert!(done.error_message.is_none());
    }

    #[test]
    fn progress_ignored_before_processing() {
        let repo = JobRepository::new();
        let created = repo.create(job("me"));
        assert!(!repo.set_progress(created.id, 10));
        assert_eq!(repo.get(created.id).unwrap().progress, 0);
    }

    #[test]
    fn failing_a_queued_job_is_allowed() {
        let repo = JobRepository::new();
        let created = repo.create(job("me"));
        assert!(repo.fail(created.id, "queue rejected".into()));
        assert_eq!(repo.get(created.id).unwrap().status, JobStatus::Failed);
    }

    #[test]
    fn history_is_newest_first_and_owner_scoped() {
        let repo = JobRepository::new();
        let first = repo.create(job("me"));
        repo.create(job("other"));
        let second = repo.create(job("me"));

        let mine = repo.list_by_owner("me");
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, second.id);
        assert_eq!(mine[1].id, first.id);
    }
}
