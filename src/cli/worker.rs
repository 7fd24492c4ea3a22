use std::sync::Arc;

use clap::Parser;

use crate::cli::{SubCommandExtend, shutdown_on_ctrl_c};
use crate::config::{IndexOptions, Opts, QueueOptions};
use crate::consumer::Consumer;

#[derive(Parser, Debug, Clone)]
pub struct WorkerCommand {
    #[command(flatten)]
    pub index: IndexOptions,
    #[command(flatten)]
    pub queue: QueueOptions,
}

impl SubCommandExtend for WorkerCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let db = opts.open_db().await?;
        let queue = self.queue.open(db.clone());
        let consumer = Consumer::new(Arc::new(self.index.indexer(db)));

        consumer.run(&queue, &self.queue.queue, shutdown_on_ctrl_c()).await?;
        Ok(())
    }
}
