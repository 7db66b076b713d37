//! The queue system the finder reads from.

use crate::error::BackendResult;
use crate::job::{Job, Timestamp};
use crate::search::SearchTerm;

/// Read-only view of an external job-queue system.
///
/// Every call is an independent round trip; nothing here promises a
/// consistent snapshot across calls. Peeks always return a sequence, so an
/// adapter whose client hands back a bare job for a one-element range must
/// wrap it itself.
pub trait QueueBackend: Send + Sync {
    /// Names of all queues, in the backend's order.
    fn queues(&self) -> BackendResult<Vec<String>>;

    /// Number of jobs waiting in `queue`.
    fn queue_size(&self, queue: &str) -> BackendResult<usize>;

    /// Up to `limit` jobs of `queue`, starting at `offset`.
    fn peek_queue(&self, queue: &str, offset: usize, limit: usize) -> BackendResult<Vec<Job>>;

    /// Number of distinct timestamps in the delayed schedule.
    fn delayed_schedule_size(&self) -> BackendResult<usize>;

    /// Up to `limit` delayed timestamps, starting at `offset`.
    fn peek_delayed_schedule(&self, offset: usize, limit: usize) -> BackendResult<Vec<Timestamp>>;

    /// Number of jobs scheduled at `timestamp`.
    fn delayed_timestamp_size(&self, timestamp: Timestamp) -> BackendResult<usize>;

    /// Up to `limit` jobs scheduled at `timestamp`, starting at `offset`.
    fn peek_delayed_timestamp(
        &self,
        timestamp: Timestamp,
        offset: usize,
        limit: usize,
    ) -> BackendResult<Vec<Job>>;

    /// Jobs currently being processed whose class matches `term`, already
    /// tagged `where_at = "working"`.
    fn working_jobs(&self, term: &SearchTerm) -> BackendResult<Vec<Job>>;
}
