use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::watch;

use crate::error::{IndexError, Result};
use crate::indexer::{IndexOutcome, Indexer};
use crate::message::IndexRequest;
use crate::metrics;
use crate::queue::{QueueChannel, WorkQueue};
use crate::source::SourceFetcher;

/// 消费者状态：Stopped → Listening → [Consuming]* → Draining → Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Stopped,
    Listening,
    Consuming,
    Draining,
}

/// 从工作队列中逐条取出索引请求并处理
///
/// 同一时间只处理一条消息。失败的消息只记录日志，不会重试。
pub struct Consumer<F> {
    indexer: Arc<Indexer<F>>,
    state: watch::Sender<ConsumerState>,
}

impl<F: SourceFetcher> Consumer<F> {
    pub fn new(indexer: Arc<Indexer<F>>) -> Self {
        Self { indexer, state: watch::Sender::new(ConsumerState::Stopped) }
    }

    /// 订阅状态变化
    pub fn state(&self) -> watch::Receiver<ConsumerState> {
        self.state.subscribe()
    }

    /// 连接队列并持续消费，直到 `shutdown` 变为 true 或发送端被关闭
    ///
    /// 只有队列连接丢失时才会返回错误。收到停止信号后会等待当前消息处理完成。
    pub async fn run<Q: WorkQueue>(
        &self,
        queue: &Q,
        name: &str,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut channel = queue.attach(name).await?;
        info!("开始监听队列: {}", name);
        self.state.send_replace(ConsumerState::Listening);

        let result = self.listen(&mut channel, &mut shutdown).await;

        self.state.send_replace(ConsumerState::Draining);
        drop(channel);
        self.state.send_replace(ConsumerState::Stopped);

        match &result {
            Ok(()) => info!("队列 {} 已停止监听", name),
            Err(e) => error!("队列 {} 连接丢失: {}", name, e),
        }
        result
    }

    async fn listen<C: QueueChannel>(
        &self,
        channel: &mut C,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        loop {
            let payload = tokio::select! {
                biased;
                _ = stopped(shutdown) => return Ok(()),
                payload = channel.receive() => payload?,
            };

            self.state.send_replace(ConsumerState::Consuming);
            let handle = self.handle(&payload);
            tokio::pin!(handle);
            // 处理中收到停止信号时不取消当前消息，只是不再接收新消息
            let draining = tokio::select! {
                biased;
                _ = &mut handle => false,
                _ = stopped(shutdown) => true,
            };
            if draining {
                self.state.send_replace(ConsumerState::Draining);
                info!("等待当前消息处理完成");
                handle.await;
                return Ok(());
            }
            self.state.send_replace(ConsumerState::Listening);
        }
    }

    /// 处理单条消息，错误在这里被吞掉
    async fn handle(&self, payload: &[u8]) {
        match self.process(payload).await {
            Ok(outcome) => {
                debug!("消息处理完成: {:?}", outcome);
                metrics::inc_message("ok");
            }
            Err(e) => {
                match &e {
                    IndexError::Validation(_) => warn!("丢弃无效消息: {}", e),
                    _ => error!("索引失败，消息已丢弃: {}", e),
                }
                metrics::inc_message(e.kind());
            }
        }
    }

    async fn process(&self, payload: &[u8]) -> Result<IndexOutcome> {
        let request = IndexRequest::parse(payload)?;
        self.indexer.index_request(&request).await
    }
}

/// 等待停止信号，发送端被 drop 同样视为停止
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|&stop| stop).await;
}
