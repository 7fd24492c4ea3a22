use futures::{Stream, TryStreamExt};

use super::Database;
use super::model::{FingerprintRecord, hash_from_db, hash_to_db};
use crate::error::{IndexError, Result};

/// 每张图片一条指纹记录
#[derive(Clone)]
pub struct HashStore {
    db: Database,
}

impl HashStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 写入指纹，已存在时覆盖旧值
    pub async fn put(&self, picture_id: i64, hash: u64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fingerprint (picture_id, hash)
            VALUES (?, ?)
            ON CONFLICT (picture_id) DO UPDATE SET hash = excluded.hash
            "#,
        )
        .bind(picture_id)
        .bind(hash_to_db(hash))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn get(&self, picture_id: i64) -> Result<Option<u64>> {
        let hash: Option<i64> =
            sqlx::query_scalar(r#"SELECT hash FROM fingerprint WHERE picture_id = ?"#)
                .bind(picture_id)
                .fetch_optional(&self.db)
                .await?;

        Ok(hash.map(hash_from_db))
    }

    /// 逐条返回除 `picture_id` 以外的所有指纹
    ///
    /// 每次调用都会重新发起查询，不会一次性加载整个数据集
    pub fn all_except(
        &self,
        picture_id: i64,
    ) -> impl Stream<Item = Result<FingerprintRecord>> + Send + Unpin + '_ {
        sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT picture_id, hash FROM fingerprint WHERE picture_id <> ?"#,
        )
        .bind(picture_id)
        .fetch(&self.db)
        .map_ok(|(picture_id, hash)| FingerprintRecord { picture_id, hash: hash_from_db(hash) })
        .err_into::<IndexError>()
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM fingerprint"#)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}
