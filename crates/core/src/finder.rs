//! Search for jobs by class name across working, delayed and queued jobs.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::backend::QueueBackend;
use crate::error::{FinderError, FinderResult, JobOrigin};
use crate::job::{Job, QUEUE_KEY, TIMESTAMP_KEY, Timestamp, WhereAt};
use crate::search::SearchTerm;

/// Finds jobs whose class name contains a search term.
///
/// Results are ordered working, then delayed (grouped by timestamp in the
/// backend's order), then queued (grouped by queue in the backend's order).
/// Reads are not a snapshot: a job moving between collections mid-scan may
/// show up twice or not at all.
pub struct JobFinder<'a, B: QueueBackend + ?Sized> {
    backend: &'a B,
    search_term: SearchTerm,
}

impl<'a, B: QueueBackend + ?Sized> JobFinder<'a, B> {
    pub fn new(backend: &'a B, search_term: Option<&str>) -> Self {
        Self {
            backend,
            search_term: SearchTerm::new(search_term),
        }
    }

    /// All matching jobs, each a new record tagged with where it was found.
    ///
    /// An empty term returns nothing without touching the backend.
    #[instrument(skip(self), fields(search_term = %self.search_term), err)]
    pub fn find_jobs(&self) -> FinderResult<Vec<Job>> {
        if self.search_term.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = self.working_jobs()?;
        let working = results.len();
        results.extend(self.delayed_jobs()?);
        let delayed = results.len() - working;
        results.extend(self.queued_jobs()?);
        let queued = results.len() - working - delayed;

        debug!(working, delayed, queued, "job search complete");
        Ok(results)
    }

    fn working_jobs(&self) -> FinderResult<Vec<Job>> {
        // The backend owns the matching scope for working jobs.
        Ok(self.backend.working_jobs(&self.search_term)?)
    }

    fn delayed_jobs(&self) -> FinderResult<Vec<Job>> {
        let schedule_size = self.backend.delayed_schedule_size()?;
        let timestamps = self.backend.peek_delayed_schedule(0, schedule_size)?;

        let mut matches = Vec::new();
        for timestamp in timestamps {
            let count = self.backend.delayed_timestamp_size(timestamp)?;
            let jobs = self.backend.peek_delayed_timestamp(timestamp, 0, count)?;
            for job in &jobs {
                if self.is_match(job, WhereAt::Delayed, || JobOrigin::Timestamp(timestamp))? {
                    matches.push(tag_delayed(job, timestamp));
                }
            }
        }
        Ok(matches)
    }

    fn queued_jobs(&self) -> FinderResult<Vec<Job>> {
        let mut matches = Vec::new();
        for queue in self.backend.queues()? {
            let size = self.backend.queue_size(&queue)?;
            let jobs = self.backend.peek_queue(&queue, 0, size)?;
            for job in &jobs {
                if self.is_match(job, WhereAt::Queued, || JobOrigin::Queue(queue.clone()))? {
                    matches.push(tag_queued(job, &queue));
                }
            }
        }
        Ok(matches)
    }

    fn is_match(
        &self,
        job: &Job,
        where_at: WhereAt,
        origin: impl FnOnce() -> JobOrigin,
    ) -> FinderResult<bool> {
        let class_name = job.class_name().ok_or_else(|| FinderError::MissingClass {
            where_at,
            origin: Some(origin()),
        })?;
        Ok(self.search_term.matches(class_name))
    }
}

fn tag_delayed(job: &Job, timestamp: Timestamp) -> Job {
    job.tagged(WhereAt::Delayed, [(TIMESTAMP_KEY, Value::from(timestamp.as_secs()))])
}

fn tag_queued(job: &Job, queue: &str) -> Job {
    job.tagged(WhereAt::Queued, [(QUEUE_KEY, Value::from(queue))])
}
