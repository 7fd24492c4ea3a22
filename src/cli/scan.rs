use std::path::{Path, PathBuf};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use walkdir::WalkDir;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, QueueOptions};
use crate::message::IndexRequest;
use crate::queue::WorkQueue;

#[derive(Parser, Debug, Clone)]
pub struct ScanCommand {
    #[command(flatten)]
    pub queue: QueueOptions,
    /// 图片所在目录，文件名（不含后缀）必须为图片 ID
    pub path: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png,webp,bmp,gif")]
    pub suffix: String,
}

impl SubCommandExtend for ScanCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let re_suf = Regex::new(&format!("(?i)^({})$", self.suffix.replace(',', "|")))?;
        let queue = self.queue.open(opts.open_db().await?);

        let pb = ProgressBar::no_length().with_style(pb_style()?);
        let (mut added, mut skipped) = (0u64, 0u64);

        for entry in WalkDir::new(&self.path).into_iter().filter_map(|entry| entry.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            pb.inc(1);
            let path = entry.path();
            let Some(picture_id) = picture_id(path, &re_suf) else {
                skipped += 1;
                continue;
            };
            let source = std::path::absolute(path)?.to_string_lossy().into_owned();
            let request = IndexRequest::new(picture_id, Some(source));
            queue.enqueue(&self.queue.queue, &request.to_payload()).await?;
            added += 1;
            pb.set_message(format!("{}", path.display()));
        }

        pb.finish_with_message(format!("扫描完成，加入队列 {} 张，跳过 {} 个文件", added, skipped));
        Ok(())
    }
}

/// 后缀匹配且文件名为整数时返回图片 ID
fn picture_id(path: &Path, re_suf: &Regex) -> Option<i64> {
    let ext = path.extension()?.to_str()?;
    if !re_suf.is_match(ext) {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

fn pb_style() -> anyhow::Result<ProgressStyle> {
    Ok(ProgressStyle::with_template("[{elapsed_precise}] {pos} {wide_msg}")?)
}
