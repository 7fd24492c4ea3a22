use thiserror::Error;

/// 索引流程中可能出现的错误
#[derive(Debug, Error)]
pub enum IndexError {
    /// 队列连接丢失，消费循环无法继续
    #[error("queue transport error: {0}")]
    Transport(String),

    #[error("empty image source")]
    EmptySource,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// 无法解析或读取图片来源
    #[error("image source unavailable: {location}: {reason}")]
    Source { location: String, reason: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// 消息格式不合法
    #[error("invalid index request: {0}")]
    Validation(#[from] serde_json::Error),
}

impl IndexError {
    /// 是否需要终止消费循环
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// 用于日志和指标的简短分类名
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::EmptySource => "empty_source",
            Self::Decode(_) => "decode",
            Self::Source { .. } => "source",
            Self::Persistence(_) => "persistence",
            Self::Validation(_) => "validation",
        }
    }
}

pub type Result<T, E = IndexError> = std::result::Result<T, E>;
