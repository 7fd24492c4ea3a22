use sqlx::{Executor, Result, Sqlite};

/// 追加一条消息到队尾
pub async fn push<'c, E>(executor: E, queue: &str, payload: &[u8]) -> Result<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO work_queue (queue, payload)
        VALUES (?, ?)
        "#,
    )
    .bind(queue)
    .bind(payload)
    .execute(executor)
    .await?;

    Ok(())
}

/// 取出并删除队首消息
///
/// 读取与删除在同一条语句中完成，消息一旦取出即视为已确认
pub async fn pop<'c, E>(executor: E, queue: &str) -> Result<Option<Vec<u8>>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar(
        r#"
        DELETE FROM work_queue WHERE id = (
            SELECT id FROM work_queue WHERE queue = ? ORDER BY id ASC LIMIT 1
        )
        RETURNING payload
        "#,
    )
    .bind(queue)
    .fetch_optional(executor)
    .await
}

/// 队列中等待处理的消息数量
pub async fn len<'c, E>(executor: E, queue: &str) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM work_queue WHERE queue = ?"#)
        .bind(queue)
        .fetch_one(executor)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::temp_db;

    #[tokio::test]
    async fn fifo_per_queue() {
        let (_dir, db) = temp_db().await;

        push(&db, "a", b"1").await.unwrap();
        push(&db, "b", b"x").await.unwrap();
        push(&db, "a", b"2").await.unwrap();

        assert_eq!(len(&db, "a").await.unwrap(), 2);
        assert_eq!(pop(&db, "a").await.unwrap().as_deref(), Some(&b"1"[..]));
        assert_eq!(pop(&db, "a").await.unwrap().as_deref(), Some(&b"2"[..]));
        assert_eq!(pop(&db, "a").await.unwrap(), None);
        assert_eq!(len(&db, "b").await.unwrap(), 1);
    }
}
