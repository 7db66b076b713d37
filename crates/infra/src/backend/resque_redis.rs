//! Redis-backed queue backend reading Resque's keyspace (optional).
//!
//! ## Key layout (`<ns>` defaults to `resque`)
//!
//! - `<ns>:queues`: SET of queue names
//! - `<ns>:queue:<name>`: LIST of JSON job payloads, head first
//! - `<ns>:delayed_queue_schedule`: ZSET of delayed timestamps (score = member)
//! - `<ns>:delayed:<timestamp>`: LIST of JSON job payloads due at that second
//! - `<ns>:workers`: SET of worker ids
//! - `<ns>:worker:<id>`: STRING, JSON `{queue, run_at, payload}` while busy
//!
//! Every trait call opens its own connection and issues its own commands, so
//! reads across calls are not a snapshot.

use std::sync::Arc;

use serde_json::Value;
use tracing::{instrument, trace};

use jobscope_core::{BackendError, BackendResult, Job, QueueBackend, SearchTerm, Timestamp};

use crate::config::RedisConfig;
use crate::working::{WorkerEntry, WorkingJobFinder};

/// Key names under a Resque namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResqueKeys {
    namespace: String,
}

impl ResqueKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn queues(&self) -> String {
        format!("{}:queues", self.namespace)
    }

    pub fn queue(&self, name: &str) -> String {
        format!("{}:queue:{name}", self.namespace)
    }

    pub fn delayed_schedule(&self) -> String {
        format!("{}:delayed_queue_schedule", self.namespace)
    }

    pub fn delayed(&self, timestamp: Timestamp) -> String {
        format!("{}:delayed:{timestamp}", self.namespace)
    }

    pub fn workers(&self) -> String {
        format!("{}:workers", self.namespace)
    }

    pub fn worker(&self, id: &str) -> String {
        format!("{}:worker:{id}", self.namespace)
    }
}

/// Inclusive `(start, stop)` for LRANGE/ZRANGE, or `None` for an empty window.
///
/// A zero limit must not reach Redis: `start..start-1` would be read as
/// "through the end of the list" when `start` is 0.
fn range_bounds(offset: usize, limit: usize) -> Option<(isize, isize)> {
    if limit == 0 {
        return None;
    }
    let start = isize::try_from(offset).ok()?;
    let stop = start.saturating_add(isize::try_from(limit).unwrap_or(isize::MAX) - 1);
    Some((start, stop))
}

fn decode_job(raw: &str) -> BackendResult<Job> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| BackendError::decode(format!("job payload is not JSON: {e}")))?;
    Job::try_from(value)
        .map_err(|other| BackendError::decode(format!("job payload is not an object: {other}")))
}

fn decode_timestamp(raw: &str) -> BackendResult<Timestamp> {
    raw.trim()
        .parse::<i64>()
        .map(Timestamp::new)
        .map_err(|e| BackendError::decode(format!("delayed timestamp `{raw}`: {e}")))
}

fn decode_worker(id: &str, raw: &str) -> BackendResult<WorkerEntry> {
    let mut entry: WorkerEntry = serde_json::from_str(raw)
        .map_err(|e| BackendError::decode(format!("worker `{id}`: {e}")))?;
    entry.worker = id.to_string();
    Ok(entry)
}

fn command_error(command: &str, err: redis::RedisError) -> BackendError {
    BackendError::command(format!("{command} failed: {err}"))
}

#[derive(Debug, Clone)]
pub struct RedisQueueBackend {
    client: Arc<redis::Client>,
    keys: ResqueKeys,
}

impl RedisQueueBackend {
    /// Create a backend for the Resque data described by `config`.
    ///
    /// No connection is made until the first call.
    pub fn new(config: &RedisConfig) -> BackendResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| BackendError::connection(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            keys: ResqueKeys::new(config.namespace.clone()),
        })
    }

    pub fn keys(&self) -> &ResqueKeys {
        &self.keys
    }

    fn connection(&self) -> BackendResult<redis::Connection> {
        self.client
            .get_connection()
            .map_err(|e| BackendError::connection(e.to_string()))
    }

    fn list_len(&self, key: &str) -> BackendResult<usize> {
        let mut conn = self.connection()?;
        trace!(key, "LLEN");
        redis::cmd("LLEN")
            .arg(key)
            .query(&mut conn)
            .map_err(|e| command_error("LLEN", e))
    }

    fn list_range(&self, key: &str, offset: usize, limit: usize) -> BackendResult<Vec<Job>> {
        let Some((start, stop)) = range_bounds(offset, limit) else {
            return Ok(Vec::new());
        };

        let mut conn = self.connection()?;
        trace!(key, start, stop, "LRANGE");
        let raw: Vec<String> = redis::cmd("LRANGE")
            .arg(key)
            .arg(start)
            .arg(stop)
            .query(&mut conn)
            .map_err(|e| command_error("LRANGE", e))?;

        raw.iter().map(|payload| decode_job(payload)).collect()
    }

    fn set_members(&self, key: &str) -> BackendResult<Vec<String>> {
        let mut conn = self.connection()?;
        trace!(key, "SMEMBERS");
        let mut members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(key)
            .query(&mut conn)
            .map_err(|e| command_error("SMEMBERS", e))?;
        // SMEMBERS order is unspecified; sort so results are repeatable.
        members.sort();
        Ok(members)
    }
}

impl QueueBackend for RedisQueueBackend {
    #[instrument(skip(self), err)]
    fn queues(&self) -> BackendResult<Vec<String>> {
        self.set_members(&self.keys.queues())
    }

    #[instrument(skip(self), err)]
    fn queue_size(&self, queue: &str) -> BackendResult<usize> {
        self.list_len(&self.keys.queue(queue))
    }

    #[instrument(skip(self), err)]
    fn peek_queue(&self, queue: &str, offset: usize, limit: usize) -> BackendResult<Vec<Job>> {
        self.list_range(&self.keys.queue(queue), offset, limit)
    }

    #[instrument(skip(self), err)]
    fn delayed_schedule_size(&self) -> BackendResult<usize> {
        let mut conn = self.connection()?;
        redis::cmd("ZCARD")
            .arg(self.keys.delayed_schedule())
            .query(&mut conn)
            .map_err(|e| command_error("ZCARD", e))
    }

    #[instrument(skip(self), err)]
    fn peek_delayed_schedule(&self, offset: usize, limit: usize) -> BackendResult<Vec<Timestamp>> {
        let Some((start, stop)) = range_bounds(offset, limit) else {
            return Ok(Vec::new());
        };

        let mut conn = self.connection()?;
        let raw: Vec<String> = redis::cmd("ZRANGE")
            .arg(self.keys.delayed_schedule())
            .arg(start)
            .arg(stop)
            .query(&mut conn)
            .map_err(|e| command_error("ZRANGE", e))?;

        raw.iter().map(|ts| decode_timestamp(ts)).collect()
    }

    #[instrument(skip(self), err)]
    fn delayed_timestamp_size(&self, timestamp: Timestamp) -> BackendResult<usize> {
        self.list_len(&self.keys.delayed(timestamp))
    }

    #[instrument(skip(self), err)]
    fn peek_delayed_timestamp(
        &self,
        timestamp: Timestamp,
        offset: usize,
        limit: usize,
    ) -> BackendResult<Vec<Job>> {
        self.list_range(&self.keys.delayed(timestamp), offset, limit)
    }

    #[instrument(skip(self, term), fields(search_term = %term), err)]
    fn working_jobs(&self, term: &SearchTerm) -> BackendResult<Vec<Job>> {
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let ids = self.set_members(&self.keys.workers())?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let worker_keys: Vec<String> = ids.iter().map(|id| self.keys.worker(id)).collect();
        let mut conn = self.connection()?;
        let documents: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&worker_keys)
            .query(&mut conn)
            .map_err(|e| command_error("MGET", e))?;

        // Idle workers have no document; a worker may also exit between calls.
        let entries = ids
            .iter()
            .zip(documents)
            .filter_map(|(id, doc)| doc.filter(|d| !d.is_empty()).map(|d| (id, d)))
            .map(|(id, doc)| decode_worker(id, &doc))
            .collect::<BackendResult<Vec<_>>>()?;

        Ok(WorkingJobFinder::new(term).find_jobs(&entries))
    }
}
