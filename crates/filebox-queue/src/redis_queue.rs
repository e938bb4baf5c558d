//! Task queue backed by a Redis list.
//!
//! Producers `LPUSH` onto the list and the worker `BRPOP`s from the other
//! end, which yields FIFO order.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, AsyncConnectionConfig};
use tracing::debug;

use filebox_models::ThumbnailTask;

use crate::codec::{decode_task, encode_task};
use crate::error::{QueueError, QueueResult};
use crate::queue::{QueueConfig, TaskQueue};

/// Extra time granted to the connection on top of the BRPOP timeout before
/// the client gives up on the reply.
const RESPONSE_GRACE: Duration = Duration::from_secs(5);

/// Smallest timeout sent to Redis; BRPOP treats 0 as "block forever".
const MIN_POP_TIMEOUT: Duration = Duration::from_millis(10);

/// Redis list task queue.
pub struct RedisTaskQueue {
    client: redis::Client,
    config: QueueConfig,
}

impl RedisTaskQueue {
    /// Create a new Redis queue. No connection is made until first use.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    pub fn queue_name(&self) -> &str {
        &self.config.queue_name
    }

    async fn connection(&self, response_timeout: Duration) -> QueueResult<MultiplexedConnection> {
        let config = AsyncConnectionConfig::new().set_response_timeout(response_timeout);
        self.client
            .get_multiplexed_async_connection_with_config(&config)
            .await
            .map_err(|e| QueueError::connection_failed(e.to_string()))
    }
}

#[async_trait]
impl TaskQueue for RedisTaskQueue {
    async fn push(&self, task: &ThumbnailTask) -> QueueResult<()> {
        let payload = encode_task(task)?;
        let mut conn = self.connection(RESPONSE_GRACE).await?;

        conn.lpush::<_, _, ()>(&self.config.queue_name, &payload)
            .await
            .map_err(|e| QueueError::enqueue_failed(e.to_string()))?;

        debug!(
            material_id = task.material_id(),
            key = %task.key(),
            "Pushed thumbnail task onto {}", self.config.queue_name
        );
        Ok(())
    }

    async fn pop_blocking(&self, timeout: Duration) -> QueueResult<Option<ThumbnailTask>> {
        let timeout = timeout.max(MIN_POP_TIMEOUT);
        let mut conn = self.connection(timeout + RESPONSE_GRACE).await?;

        let reply: Option<(String, String)> = conn
            .brpop(&self.config.queue_name, timeout.as_secs_f64())
            .await
            .map_err(|e| QueueError::dequeue_failed(e.to_string()))?;

        match reply {
            Some((_list, payload)) => decode_task(&payload).map(Some),
            None => Ok(None),
        }
    }

    async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.connection(RESPONSE_GRACE).await?;
        let len: u64 = conn.llen(&self.config.queue_name).await?;
        Ok(len)
    }
}
