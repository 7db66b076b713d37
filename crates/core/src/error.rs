//! Error model for backend access and job search.

use thiserror::Error;

use crate::job::{Timestamp, WhereAt};

/// Result type used by [`crate::QueueBackend`] implementations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type returned by [`crate::JobFinder`].
pub type FinderResult<T> = Result<T, FinderError>;

/// Failure reported by a queue backend.
///
/// Adapters map their client errors onto these variants; the finder never
/// inspects or retries them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("backend connection error: {0}")]
    Connection(String),

    /// A backend command was rejected or failed mid-flight.
    #[error("backend command error: {0}")]
    Command(String),

    /// Stored job data could not be decoded.
    #[error("malformed job data: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Failure surfaced by [`crate::JobFinder::find_jobs`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// Passed through from the backend unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A job payload had no string `class` field.
    #[error("{where_at} job without a `class` field{}", describe_origin(.origin))]
    MissingClass {
        where_at: WhereAt,
        origin: Option<JobOrigin>,
    },
}

/// Where a malformed job was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOrigin {
    Queue(String),
    Timestamp(Timestamp),
}

fn describe_origin(origin: &Option<JobOrigin>) -> String {
    match origin {
        Some(JobOrigin::Queue(queue)) => format!(" in queue `{queue}`"),
        Some(JobOrigin::Timestamp(ts)) => format!(" at timestamp {ts}"),
        None => String::new(),
    }
}
