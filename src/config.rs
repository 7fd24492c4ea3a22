use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;
use crate::db::{Database, init_db};
use crate::indexer::Indexer;
use crate::queue::{DEFAULT_QUEUE, SqliteQueue};
use crate::similarity::DEFAULT_THRESHOLD;
use crate::source::{FsFetcher, TemplateResolver};

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs = ProjectDirs::from("", "imdedup", "imdedup").expect("failed to get project dir");
    ConfDir { path: proj_dirs.config_dir().to_path_buf() }
});

fn default_config_dir() -> &'static str {
    CONF_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct IndexOptions {
    /// 判定为近似重复的最大汉明距离，范围从 0 到 64
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_THRESHOLD, value_parser = clap::value_parser!(u32).range(0..=64))]
    pub threshold: u32,
    /// 相对路径的图片来源基于此目录解析
    #[arg(long, value_name = "DIR")]
    pub source_root: Option<PathBuf>,
    /// 请求中没有图片来源时使用的路径模板，`{id}` 会被替换为图片 ID
    /// 例：--source-template '/srv/pictures/{id}.jpg'
    #[arg(long, value_name = "TEMPLATE", verbatim_doc_comment)]
    pub source_template: Option<String>,
}

impl IndexOptions {
    pub fn indexer(&self, db: Database) -> Indexer {
        let indexer = Indexer::new(db, FsFetcher::new(self.source_root.clone()), self.threshold);
        match &self.source_template {
            Some(template) => indexer.with_resolver(TemplateResolver::new(template.clone())),
            None => indexer,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct QueueOptions {
    /// 工作队列名
    #[arg(short, long, value_name = "NAME", default_value = DEFAULT_QUEUE)]
    pub queue: String,
    /// 队列为空时的轮询间隔，单位为毫秒
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub poll_interval_ms: u64,
}

impl QueueOptions {
    pub fn open(&self, db: Database) -> SqliteQueue {
        SqliteQueue::new(db, Duration::from_millis(self.poll_interval_ms))
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "imdedup", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// imdedup 配置文件目录
    #[arg(short, long, default_value = default_config_dir())]
    pub conf_dir: ConfDir,
}

impl Opts {
    /// 打开数据库，目录不存在时自动创建
    pub async fn open_db(&self) -> anyhow::Result<Database> {
        std::fs::create_dir_all(self.conf_dir.path())?;
        Ok(init_db(self.conf_dir.database()).await?)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 立即索引一张图片
    Index(IndexCommand),
    /// 将一张图片加入索引队列
    Enqueue(EnqueueCommand),
    /// 扫描目录，将文件名为数字 ID 的图片加入索引队列
    Scan(ScanCommand),
    /// 持续消费索引队列
    Worker(WorkerCommand),
    /// 启动 HTTP 服务，同时消费索引队列
    Server(ServerCommand),
    /// 查询与某张图片近似重复的图片
    Similar(SimilarCommand),
    /// 显示数据库统计信息
    Stats(StatsCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("imdedup.db")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}
