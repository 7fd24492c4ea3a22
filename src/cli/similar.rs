use std::convert::Infallible;
use std::str::FromStr;

use clap::{Parser, ValueEnum};

use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::db::{DistanceStore, Edge};

#[derive(Parser, Debug, Clone)]
pub struct SimilarCommand {
    /// 图片 ID
    pub id: i64,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SimilarCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let distances = DistanceStore::new(opts.open_db().await?);
        let edges = distances.edges_of(self.id).await?;
        print_result(&edges, self.output_format)
    }
}

fn print_result(result: &[Edge], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for edge in result {
                println!("{}\t{}", edge.distance, edge.other_id);
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}

impl FromStr for OutputFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            _ => Ok(Self::Table),
        }
    }
}
