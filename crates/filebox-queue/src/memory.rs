//! In-process task queue.
//!
//! Mirrors the Redis adapter: payloads are stored encoded, pops block with a
//! timeout, and undecodable payloads are consumed and reported. Used for
//! local development and tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use filebox_models::ThumbnailTask;

use crate::codec::{decode_task, encode_task};
use crate::error::{QueueError, QueueResult};
use crate::queue::TaskQueue;

#[derive(Default)]
pub struct MemoryTaskQueue {
    items: Mutex<VecDeque<String>>,
    notify: Notify,
    unavailable: AtomicBool,
}

impl MemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an already-encoded payload, bypassing validation and encoding.
    pub async fn push_raw(&self, payload: impl Into<String>) {
        self.items.lock().await.push_back(payload.into());
        self.notify.notify_one();
    }

    /// Simulate the queue service being unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> QueueResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(QueueError::connection_failed("memory queue unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskQueue for MemoryTaskQueue {
    async fn push(&self, task: &ThumbnailTask) -> QueueResult<()> {
        self.check_available()?;
        let payload = encode_task(task)?;
        self.push_raw(payload).await;
        Ok(())
    }

    async fn pop_blocking(&self, timeout: Duration) -> QueueResult<Option<ThumbnailTask>> {
        self.check_available()?;
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(payload) = self.items.lock().await.pop_front() {
                return decode_task(&payload).map(Some);
            }

            // notify_one stores a permit when nobody is waiting, so a push
            // between the check above and this wait is not lost.
            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                return Ok(None);
            }
        }
    }

    async fn len(&self) -> QueueResult<u64> {
        self.check_available()?;
        Ok(self.items.lock().await.len() as u64)
    }
}
