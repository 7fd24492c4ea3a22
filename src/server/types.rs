use serde::Serialize;
use utoipa::ToSchema;

use crate::db::Edge;

/// 加入队列的结果
#[derive(Debug, Serialize, ToSchema)]
pub struct EnqueueResponse {
    /// 队列名
    pub queue: String,
    pub picture_id: i64,
}

/// 相似图片查询结果
#[derive(Debug, Serialize, ToSchema)]
pub struct SimilarResponse {
    pub picture_id: i64,
    /// 按汉明距离从小到大排列
    pub similar: Vec<Edge>,
}
