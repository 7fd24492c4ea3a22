use super::Database;
use super::model::Edge;
use crate::error::Result;

/// 近似重复关系，每对图片存两条方向相反的边
#[derive(Clone)]
pub struct DistanceStore {
    db: Database,
}

impl DistanceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 插入一条有向边，主键已存在时什么都不做
    ///
    /// 返回是否真的插入了新记录
    pub async fn put_edge_if_absent(&self, src: i64, dst: i64, distance: u8) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO distance_edge (src_picture_id, dst_picture_id, distance)
            VALUES (?, ?, ?)
            ON CONFLICT (src_picture_id, dst_picture_id) DO NOTHING
            "#,
        )
        .bind(src)
        .bind(dst)
        .bind(i64::from(distance))
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 获取与某张图片相似的所有图片，按距离排序
    pub async fn edges_of(&self, picture_id: i64) -> Result<Vec<Edge>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT dst_picture_id, distance FROM distance_edge
            WHERE src_picture_id = ?
            ORDER BY distance ASC, dst_picture_id ASC
            "#,
        )
        .bind(picture_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(other_id, distance)| Edge { other_id, distance: distance as u8 })
            .collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM distance_edge"#)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}
