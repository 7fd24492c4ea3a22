use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;
use tokio::sync::mpsc::{Receiver, Sender, channel};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::{QueueChannel, WorkQueue};
use crate::error::{IndexError, Result};

struct Lane {
    tx: Option<Sender<Vec<u8>>>,
    rx: Arc<AsyncMutex<Receiver<Vec<u8>>>>,
}

/// 进程内队列，每个队列名对应一个有界通道
///
/// 同一队列同时只能有一个消费者连接
pub struct MemoryQueue {
    capacity: usize,
    lanes: Mutex<HashMap<String, Lane>>,
}

impl MemoryQueue {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), lanes: Mutex::new(HashMap::new()) }
    }

    fn with_lane<T>(&self, queue: &str, f: impl FnOnce(&mut Lane) -> T) -> T {
        let mut lanes = self.lanes.lock().unwrap_or_else(|e| e.into_inner());
        let lane = lanes.entry(queue.to_owned()).or_insert_with(|| {
            let (tx, rx) = channel(self.capacity);
            Lane { tx: Some(tx), rx: Arc::new(AsyncMutex::new(rx)) }
        });
        f(lane)
    }

    /// 关闭队列的发送端，消费者取完剩余消息后会收到传输错误
    pub fn close(&self, queue: &str) {
        self.with_lane(queue, |lane| lane.tx = None);
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new(num_cpus::get() * 16)
    }
}

impl WorkQueue for MemoryQueue {
    type Channel = MemoryChannel;

    async fn enqueue(&self, queue: &str, payload: &[u8]) -> Result<()> {
        let tx = self.with_lane(queue, |lane| lane.tx.clone());
        let tx = tx.ok_or_else(|| IndexError::Transport(format!("队列已关闭: {queue}")))?;
        tx.send(payload.to_vec())
            .await
            .map_err(|_| IndexError::Transport(format!("队列已关闭: {queue}")))
    }

    async fn attach(&self, queue: &str) -> Result<MemoryChannel> {
        let rx = self.with_lane(queue, |lane| lane.rx.clone());
        let rx = rx.lock_owned().await;
        debug!("连接内存队列: {}", queue);
        Ok(MemoryChannel { queue: queue.to_owned(), rx })
    }
}

/// 持有队列接收端的独占锁，drop 时释放
pub struct MemoryChannel {
    queue: String,
    rx: OwnedMutexGuard<Receiver<Vec<u8>>>,
}

impl QueueChannel for MemoryChannel {
    async fn receive(&mut self) -> Result<Vec<u8>> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| IndexError::Transport(format!("队列已关闭: {}", self.queue)))
    }
}

impl Drop for MemoryChannel {
    fn drop(&mut self) {
        debug!("释放内存队列: {}", self.queue);
    }
}
