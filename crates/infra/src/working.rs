//! Search over jobs that workers are currently processing.
//!
//! Resque records a busy worker as a JSON document holding the queue it
//! pulled from, when it started, and the job payload. Both backends feed
//! those documents through [`WorkingJobFinder`] so working jobs match with
//! exactly the same rule as delayed and queued ones.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use jobscope_core::job::QUEUE_KEY;
use jobscope_core::{Job, SearchTerm, WhereAt};

/// Key holding the id of the worker processing a job.
pub const WORKER_KEY: &str = "worker";
/// Key holding when the worker picked the job up.
pub const RUN_AT_KEY: &str = "run_at";

/// What a busy worker is doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerEntry {
    /// Worker id, e.g. `host:pid:queues`. Not part of the stored document.
    #[serde(skip)]
    pub worker: String,
    pub queue: String,
    pub run_at: String,
    pub payload: Job,
}

impl WorkerEntry {
    pub fn new(
        worker: impl Into<String>,
        queue: impl Into<String>,
        run_at: impl Into<String>,
        payload: Job,
    ) -> Self {
        Self {
            worker: worker.into(),
            queue: queue.into(),
            run_at: run_at.into(),
            payload,
        }
    }
}

/// Filters busy workers' jobs by class name.
#[derive(Debug, Clone)]
pub struct WorkingJobFinder<'a> {
    search_term: &'a SearchTerm,
}

impl<'a> WorkingJobFinder<'a> {
    pub fn new(search_term: &'a SearchTerm) -> Self {
        Self { search_term }
    }

    /// Payloads of matching entries, tagged `where_at = "working"` and
    /// carrying `queue`, `run_at` and `worker`.
    ///
    /// Entries whose payload has no class are not matches.
    pub fn find_jobs<'e, I>(&self, entries: I) -> Vec<Job>
    where
        I: IntoIterator<Item = &'e WorkerEntry>,
    {
        if self.search_term.is_empty() {
            return Vec::new();
        }

        entries
            .into_iter()
            .filter(|entry| {
                entry
                    .payload
                    .class_name()
                    .is_some_and(|class| self.search_term.matches(class))
            })
            .map(|entry| {
                entry.payload.tagged(
                    WhereAt::Working,
                    [
                        (QUEUE_KEY, Value::from(entry.queue.as_str())),
                        (RUN_AT_KEY, Value::from(entry.run_at.as_str())),
                        (WORKER_KEY, Value::from(entry.worker.as_str())),
                    ],
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(worker: &str, class: &str) -> WorkerEntry {
        WorkerEntry::new(worker, "mailers", "2026-10-18T09:30:00Z", Job::with_class(class))
    }

    #[test]
    fn matching_entries_are_tagged() {
        let term = SearchTerm::from("EMAIL");
        let entries = [entry("host:1:mailers", "SendEmail"), entry("host:2:mailers", "Cleanup")];

        let found = WorkingJobFinder::new(&term).find_jobs(&entries);

        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            json!([{
                "class": "SendEmail",
                "queue": "mailers",
                "run_at": "2026-10-18T09:30:00Z",
                "worker": "host:1:mailers",
                "where_at": "working",
            }])
        );
    }

    #[test]
    fn empty_term_matches_nothing() {
        let term = SearchTerm::new(None);
        let entries = [entry("host:1:mailers", "SendEmail")];

        assert!(WorkingJobFinder::new(&term).find_jobs(&entries).is_empty());
    }

    #[test]
    fn payload_without_class_is_skipped() {
        let term = SearchTerm::from("e");
        let entries = [WorkerEntry::new("w", "q", "now", Job::new().with_field("args", json!([])))];

        assert!(WorkingJobFinder::new(&term).find_jobs(&entries).is_empty());
    }

    #[test]
    fn decodes_resque_worker_document() {
        let raw = r#"{"queue":"mailers","run_at":"2026/10/18 09:30:00 UTC","payload":{"class":"SendEmail","args":[7]}}"#;

        let entry: WorkerEntry = serde_json::from_str(raw).unwrap();

        assert_eq!(entry.queue, "mailers");
        assert_eq!(entry.payload.class_name(), Some("SendEmail"));
        assert!(entry.worker.is_empty());
    }
}
