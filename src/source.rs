use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::{IndexError, Result};

/// 根据图片 ID 找到图片来源
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, picture_id: i64) -> Option<String>;
}

/// 将模板中的 `{id}` 替换为图片 ID，例：`/srv/pictures/{id}.jpg`
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    template: String,
}

impl TemplateResolver {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }
}

impl SourceResolver for TemplateResolver {
    fn resolve(&self, picture_id: i64) -> Option<String> {
        self.template
            .contains("{id}")
            .then(|| self.template.replace("{id}", &picture_id.to_string()))
    }
}

/// 不做任何解析，只接受消息中自带来源的请求
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl SourceResolver for NoResolver {
    fn resolve(&self, _picture_id: i64) -> Option<String> {
        None
    }
}

/// 读取图片原始字节
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// 从本地文件系统读取，支持 `file://` 前缀
#[derive(Debug, Clone, Default)]
pub struct FsFetcher {
    root: Option<PathBuf>,
}

impl FsFetcher {
    /// 相对路径会基于 `root` 解析
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn path_of(&self, location: &str) -> PathBuf {
        let path = Path::new(location.strip_prefix("file://").unwrap_or(location));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SourceFetcher for FsFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = self.path_of(location);
        tokio::fs::read(&path).await.map_err(|e| IndexError::Source {
            location: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
