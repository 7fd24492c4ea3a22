use futures::TryStreamExt;
use log::debug;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::{DistanceStore, HashStore};
use crate::error::Result;
use crate::hamming::within;
use crate::metrics;

/// 默认的近似重复阈值（64 位中最多相差 3 位）
pub const DEFAULT_THRESHOLD: u32 = 3;

/// 一次重建的统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReindexReport {
    /// 比较过的指纹数量
    pub compared: u64,
    /// 距离不超过阈值的图片数量
    pub matched: u64,
    /// 实际新插入的有向边数量
    pub inserted: u64,
}

/// 将新指纹与已有的全部指纹逐一比较，维护近似重复关系
#[derive(Clone)]
pub struct SimilarityIndexer {
    hashes: HashStore,
    distances: DistanceStore,
    threshold: u32,
}

impl SimilarityIndexer {
    pub fn new(hashes: HashStore, distances: DistanceStore, threshold: u32) -> Self {
        Self { hashes, distances, threshold: threshold.min(64) }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// 为 `picture_id` 重建与其他所有图片的边
    ///
    /// 复杂度为 O(N)，N 为已存储的指纹数量。
    /// 已存在的边不会被更新，先写入的距离保留。
    pub async fn reindex(&self, picture_id: i64, hash: u64) -> Result<ReindexReport> {
        let mut report = ReindexReport::default();
        let mut matches = vec![];

        // NOTE: 先读完整个流再写入，避免在同一连接上边读边写
        // 这里只缓存命中的图片，数量受阈值约束
        let mut rows = self.hashes.all_except(picture_id);
        while let Some(row) = rows.try_next().await? {
            report.compared += 1;
            if let Some(distance) = within(hash, row.hash, self.threshold) {
                matches.push((row.picture_id, distance));
            }
        }
        drop(rows);

        report.matched = matches.len() as u64;

        for (other_id, distance) in matches {
            // 两条边的写入不是原子的
            for (src, dst) in [(picture_id, other_id), (other_id, picture_id)] {
                if self.distances.put_edge_if_absent(src, dst, distance).await? {
                    report.inserted += 1;
                }
            }
        }

        debug!(
            "重建图片 {} 的相似关系: 比较 {} 张, 命中 {} 张, 新增 {} 条边",
            picture_id, report.compared, report.matched, report.inserted
        );
        metrics::inc_reindex(&report);

        Ok(report)
    }
}
