use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, QueueOptions};
use crate::message::IndexRequest;
use crate::queue::WorkQueue;

#[derive(Parser, Debug, Clone)]
pub struct EnqueueCommand {
    #[command(flatten)]
    pub queue: QueueOptions,
    /// 图片 ID
    pub id: i64,
    /// 图片路径，留空时由消费者通过 --source-template 推断
    pub source: Option<String>,
}

impl SubCommandExtend for EnqueueCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let queue = self.queue.open(opts.open_db().await?);
        let request = IndexRequest::new(self.id, self.source.clone());
        queue.enqueue(&self.queue.queue, &request.to_payload()).await?;
        info!("已加入队列 {}: {:?}", self.queue.queue, request);
        Ok(())
    }
}
