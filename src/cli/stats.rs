use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, QueueOptions};
use crate::db::{DistanceStore, HashStore};

#[derive(Parser, Debug, Clone)]
pub struct StatsCommand {
    #[command(flatten)]
    pub queue: QueueOptions,
}

impl SubCommandExtend for StatsCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let db = opts.open_db().await?;
        let fingerprints = HashStore::new(db.clone()).count().await?;
        let edges = DistanceStore::new(db.clone()).count().await?;
        let pending = self.queue.open(db).len(&self.queue.queue).await?;

        println!("指纹数量: {}", fingerprints);
        println!("相似关系: {}", edges);
        println!("待处理消息 ({}): {}", self.queue.queue, pending);
        Ok(())
    }
}
