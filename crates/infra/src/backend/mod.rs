//! Queue backend adapters.
//!
//! The backend contract lives in `jobscope-core`; this module provides the
//! in-memory model used by tests and demos, and the Redis reader for a live
//! Resque deployment.

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod resque_redis;

pub use in_memory::InMemoryQueueBackend;
#[cfg(feature = "redis")]
pub use resque_redis::{RedisQueueBackend, ResqueKeys};
