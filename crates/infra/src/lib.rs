//! Infrastructure layer: queue backend adapters and configuration.

pub mod backend;
pub mod config;
pub mod working;

pub use backend::InMemoryQueueBackend;
#[cfg(feature = "redis")]
pub use backend::{RedisQueueBackend, ResqueKeys};
pub use config::{ConfigError, RedisConfig};
pub use working::{WorkerEntry, WorkingJobFinder};
