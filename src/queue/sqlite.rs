use std::time::Duration;

use log::debug;
use sqlx::Sqlite;
use sqlx::pool::PoolConnection;

use super::{QueueChannel, WorkQueue};
use crate::db::{Database, queue as crud};
use crate::error::{IndexError, Result};

/// 存放在 SQLite 中的持久化队列，可以被多个进程共享
#[derive(Clone)]
pub struct SqliteQueue {
    db: Database,
    poll_interval: Duration,
}

impl SqliteQueue {
    /// `poll_interval` 为队列为空时的轮询间隔
    pub fn new(db: Database, poll_interval: Duration) -> Self {
        Self { db, poll_interval }
    }

    /// 等待处理的消息数量
    pub async fn len(&self, queue: &str) -> Result<i64> {
        Ok(crud::len(&self.db, queue).await?)
    }
}

impl WorkQueue for SqliteQueue {
    type Channel = SqliteChannel;

    async fn enqueue(&self, queue: &str, payload: &[u8]) -> Result<()> {
        Ok(crud::push(&self.db, queue, payload).await?)
    }

    async fn attach(&self, queue: &str) -> Result<SqliteChannel> {
        let conn = self.db.acquire().await.map_err(|e| IndexError::Transport(e.to_string()))?;
        debug!("连接 SQLite 队列: {}", queue);
        Ok(SqliteChannel { queue: queue.to_owned(), conn, poll_interval: self.poll_interval })
    }
}

/// 独占一个数据库连接，drop 时归还连接池
pub struct SqliteChannel {
    queue: String,
    conn: PoolConnection<Sqlite>,
    poll_interval: Duration,
}

impl QueueChannel for SqliteChannel {
    async fn receive(&mut self) -> Result<Vec<u8>> {
        loop {
            match crud::pop(&mut *self.conn, &self.queue).await {
                Ok(Some(payload)) => return Ok(payload),
                Ok(None) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => return Err(IndexError::Transport(e.to_string())),
            }
        }
    }
}

impl Drop for SqliteChannel {
    fn drop(&mut self) {
        debug!("释放 SQLite 队列: {}", self.queue);
    }
}
