use std::sync::Arc;

use crate::indexer::Indexer;
use crate::queue::SqliteQueue;

/// 应用状态
pub struct AppState {
    pub indexer: Arc<Indexer>,
    /// 异步索引使用的队列
    pub queue: SqliteQueue,
    pub queue_name: String,
    /// 鉴权 token
    pub token: String,
}

impl AppState {
    pub fn new(
        indexer: Arc<Indexer>,
        queue: SqliteQueue,
        queue_name: String,
        token: String,
    ) -> Arc<Self> {
        Arc::new(AppState { indexer, queue, queue_name, token })
    }
}
