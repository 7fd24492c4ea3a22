use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::Result;

/// 索引请求，队列消息与 HTTP 请求共用
///
/// 未知字段会被忽略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IndexRequest {
    /// 图片 ID
    pub picture_id: i64,
    /// 图片来源，为空时由解析器根据 ID 推断
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl IndexRequest {
    pub fn new(picture_id: i64, source: Option<String>) -> Self {
        Self { picture_id, source }
    }

    /// 解析队列消息，失败时返回 `IndexError::Validation`
    ///
    /// 只接受 JSON 对象，serde 默认允许的数组形式会被拒绝
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let fields: Map<String, Value> = serde_json::from_slice(payload)?;
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    pub fn to_payload(&self) -> Vec<u8> {
        // 只包含整数和字符串，序列化不会失败
        serde_json::to_vec(self).unwrap_or_default()
    }
}
