use serde::Serialize;
use utoipa::ToSchema;

/// 图片指纹记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintRecord {
    /// 图片 ID
    pub picture_id: i64,
    /// 64 位感知哈希
    pub hash: u64,
}

/// 相似图片，即一条以查询图片为起点的有向边
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Edge {
    /// 另一端的图片 ID
    pub other_id: i64,
    /// 汉明距离
    pub distance: u8,
}

/// SQLite 只有有符号整数，哈希按位存储
pub(crate) fn hash_to_db(hash: u64) -> i64 {
    hash as i64
}

pub(crate) fn hash_from_db(value: i64) -> u64 {
    value as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_bits_survive_storage() {
        for hash in [0, 1, u64::MAX, 1 << 63, 0x8000_0000_dead_beef] {
            assert_eq!(hash_from_db(hash_to_db(hash)), hash);
        }
    }
}
