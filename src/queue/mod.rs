//! 工作队列
//!
//! 消息在被取出时即视为已确认（至多一次）：处理过程中进程崩溃会丢失该消息。
//! 通道 [`QueueChannel`] 是一个有作用域的资源，被 drop 时释放。

use std::future::Future;

use crate::error::Result;

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;

/// 默认的队列名
pub const DEFAULT_QUEUE: &str = "picture-index";

pub trait WorkQueue: Send + Sync {
    type Channel: QueueChannel;

    /// 追加一条消息
    fn enqueue(&self, queue: &str, payload: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// 连接到指定队列，开始接收消息
    fn attach(&self, queue: &str) -> impl Future<Output = Result<Self::Channel>> + Send;
}

pub trait QueueChannel: Send {
    /// 等待下一条消息，返回时消息已从队列中移除
    ///
    /// 连接丢失时返回 [`IndexError::Transport`](crate::IndexError::Transport)
    fn receive(&mut self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}
