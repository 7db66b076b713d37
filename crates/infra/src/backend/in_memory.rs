//! In-memory queue backend.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use jobscope_core::{BackendResult, Job, QueueBackend, SearchTerm, Timestamp};

use crate::working::{WorkerEntry, WorkingJobFinder};

#[derive(Debug, Default)]
struct State {
    /// Queues in creation order.
    queues: Vec<(String, Vec<Job>)>,
    delayed: BTreeMap<Timestamp, Vec<Job>>,
    workers: BTreeMap<String, WorkerEntry>,
}

impl State {
    fn queue(&self, name: &str) -> Option<&Vec<Job>> {
        self.queues.iter().find(|(n, _)| n == name).map(|(_, jobs)| jobs)
    }

    fn queue_mut(&mut self, name: &str) -> &mut Vec<Job> {
        let idx = match self.queues.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.queues.push((name.to_string(), Vec::new()));
                self.queues.len() - 1
            }
        };
        &mut self.queues[idx].1
    }
}

/// In-memory model of a queue system's queues, delayed schedule and workers.
///
/// Intended for tests/dev and demos. Each call takes the lock on its own, so
/// like a real backend it offers no snapshot across calls.
#[derive(Debug, Default)]
pub struct InMemoryQueueBackend {
    state: RwLock<State>,
}

impl InMemoryQueueBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `job` to `queue`, creating the queue if needed.
    pub fn push(&self, queue: &str, job: Job) -> &Self {
        self.write().queue_mut(queue).push(job);
        self
    }

    /// Take the job at the head of `queue`.
    pub fn pop(&self, queue: &str) -> Option<Job> {
        let mut state = self.write();
        let (_, jobs) = state.queues.iter_mut().find(|(n, _)| n == queue)?;
        (!jobs.is_empty()).then(|| jobs.remove(0))
    }

    /// Drop a queue and everything in it.
    pub fn remove_queue(&self, queue: &str) {
        self.write().queues.retain(|(n, _)| n != queue);
    }

    /// Schedule `job` at `timestamp`.
    pub fn delay(&self, timestamp: Timestamp, job: Job) -> &Self {
        self.write().delayed.entry(timestamp).or_default().push(job);
        self
    }

    /// Drop every job scheduled at `timestamp`, as an enqueue of due jobs does.
    pub fn release(&self, timestamp: Timestamp) -> Vec<Job> {
        self.write().delayed.remove(&timestamp).unwrap_or_default()
    }

    /// Record that a worker is processing a job.
    pub fn work(&self, entry: WorkerEntry) -> &Self {
        self.write().workers.insert(entry.worker.clone(), entry);
        self
    }

    /// Mark a worker idle.
    pub fn finish(&self, worker: &str) -> Option<WorkerEntry> {
        self.write().workers.remove(worker)
    }
}

fn window<T: Clone>(items: &[T], offset: usize, limit: usize) -> Vec<T> {
    items.iter().skip(offset).take(limit).cloned().collect()
}

impl QueueBackend for InMemoryQueueBackend {
    fn queues(&self) -> BackendResult<Vec<String>> {
        Ok(self.read().queues.iter().map(|(n, _)| n.clone()).collect())
    }

    fn queue_size(&self, queue: &str) -> BackendResult<usize> {
        Ok(self.read().queue(queue).map_or(0, Vec::len))
    }

    fn peek_queue(&self, queue: &str, offset: usize, limit: usize) -> BackendResult<Vec<Job>> {
        Ok(self
            .read()
            .queue(queue)
            .map(|jobs| window(jobs, offset, limit))
            .unwrap_or_default())
    }

    fn delayed_schedule_size(&self) -> BackendResult<usize> {
        Ok(self.read().delayed.len())
    }

    fn peek_delayed_schedule(&self, offset: usize, limit: usize) -> BackendResult<Vec<Timestamp>> {
        Ok(self.read().delayed.keys().copied().skip(offset).take(limit).collect())
    }

    fn delayed_timestamp_size(&self, timestamp: Timestamp) -> BackendResult<usize> {
        Ok(self.read().delayed.get(&timestamp).map_or(0, Vec::len))
    }

    fn peek_delayed_timestamp(
        &self,
        timestamp: Timestamp,
        offset: usize,
        limit: usize,
    ) -> BackendResult<Vec<Job>> {
        Ok(self
            .read()
            .delayed
            .get(&timestamp)
            .map(|jobs| window(jobs, offset, limit))
            .unwrap_or_default())
    }

    fn working_jobs(&self, term: &SearchTerm) -> BackendResult<Vec<Job>> {
        let state = self.read();
        Ok(WorkingJobFinder::new(term).find_jobs(state.workers.values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscope_core::JobFinder;
    use serde_json::json;

    fn backend() -> InMemoryQueueBackend {
        let backend = InMemoryQueueBackend::new();
        backend
            .push("mailers", Job::with_class("SendEmail"))
            .push("mailers", Job::with_class("SendNewsletter"))
            .push("reports", Job::with_class("GenerateReport"))
            .delay(Timestamp::new(200), Job::with_class("EmailDigest"))
            .delay(Timestamp::new(100), Job::with_class("Cleanup"))
            .work(WorkerEntry::new(
                "host:42:mailers",
                "mailers",
                "2026-10-18T09:30:00Z",
                Job::with_class("SendWelcomeEmail"),
            ));
        backend
    }

    #[test]
    fn peek_windows_are_clamped() {
        let backend = backend();

        assert_eq!(backend.queue_size("mailers").unwrap(), 2);
        assert_eq!(backend.peek_queue("mailers", 1, 10).unwrap(), vec![Job::with_class("SendNewsletter")]);
        assert!(backend.peek_queue("mailers", 0, 0).unwrap().is_empty());
        assert!(backend.peek_queue("missing", 0, 5).unwrap().is_empty());
        assert_eq!(backend.queue_size("missing").unwrap(), 0);
    }

    #[test]
    fn delayed_schedule_is_chronological() {
        let backend = backend();

        assert_eq!(backend.delayed_schedule_size().unwrap(), 2);
        assert_eq!(
            backend.peek_delayed_schedule(0, 2).unwrap(),
            vec![Timestamp::new(100), Timestamp::new(200)]
        );
        assert_eq!(backend.delayed_timestamp_size(Timestamp::new(100)).unwrap(), 1);
    }

    #[test]
    fn queues_keep_creation_order() {
        let backend = backend();
        assert_eq!(backend.queues().unwrap(), vec!["mailers", "reports"]);

        backend.remove_queue("mailers");
        assert_eq!(backend.queues().unwrap(), vec!["reports"]);
    }

    #[test]
    fn finds_jobs_in_every_collection() {
        let backend = backend();

        let found = JobFinder::new(&backend, Some("Email")).find_jobs().unwrap();

        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            json!([
                {
                    "class": "SendWelcomeEmail",
                    "queue": "mailers",
                    "run_at": "2026-10-18T09:30:00Z",
                    "worker": "host:42:mailers",
                    "where_at": "working",
                },
                {"class": "EmailDigest", "timestamp": 200, "where_at": "delayed"},
                {"class": "SendEmail", "queue": "mailers", "where_at": "queued"},
            ])
        );
    }

    #[test]
    fn reflects_changes_between_searches() {
        let backend = backend();
        let finder = JobFinder::new(&backend, Some("send"));
        assert_eq!(finder.find_jobs().unwrap().len(), 3);

        backend.pop("mailers");
        backend.finish("host:42:mailers");
        backend.release(Timestamp::new(200));

        let found = finder.find_jobs().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].class_name(), Some("SendNewsletter"));
    }
}
