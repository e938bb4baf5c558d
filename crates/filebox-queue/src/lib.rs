//! Redis list job queue for thumbnail tasks.
//!
//! This crate provides:
//! - The [`TaskQueue`] port used by producers and the worker
//! - A Redis list adapter (`LPUSH` / `BRPOP`)
//! - An in-memory adapter with the same semantics
//! - The [`ThumbnailProducer`] called from the file-save path

pub mod codec;
pub mod error;
pub mod memory;
pub mod producer;
pub mod queue;
pub mod redis_queue;

pub use error::{QueueError, QueueResult};
pub use memory::MemoryTaskQueue;
pub use producer::ThumbnailProducer;
pub use queue::{QueueConfig, TaskQueue};
pub use redis_queue::RedisTaskQueue;
