//! `jobscope-core` — search for jobs by class name in an external queue system.
//!
//! This crate holds the search itself and the backend contract it reads
//! through. It has no storage of its own; adapters live in `jobscope-infra`.

pub mod backend;
pub mod error;
pub mod finder;
pub mod job;
pub mod search;

pub use backend::QueueBackend;
pub use error::{BackendError, BackendResult, FinderError, FinderResult, JobOrigin};
pub use finder::JobFinder;
pub use job::{Job, Timestamp, WhereAt};
pub use search::SearchTerm;
