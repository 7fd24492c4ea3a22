use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::{IndexOptions, Opts};
use crate::db::Edge;

#[derive(Parser, Debug, Clone)]
pub struct IndexCommand {
    #[command(flatten)]
    pub index: IndexOptions,
    /// 图片 ID
    pub id: i64,
    /// 图片路径，支持 file:// 前缀
    pub source: String,
}

impl SubCommandExtend for IndexCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let indexer = self.index.indexer(opts.open_db().await?);
        let outcome = indexer.index(self.id, &self.source).await?;

        println!("{}\t{:016x}", outcome.picture_id, outcome.hash);
        for Edge { other_id, distance } in indexer.edges_of(self.id).await? {
            println!("{}\t{}", distance, other_id);
        }
        Ok(())
    }
}
