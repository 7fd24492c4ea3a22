use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum_auth::AuthBearer;
use log::info;

use super::error::{Result, Unauthorized};
use super::state::AppState;
use super::types::*;
use crate::indexer::IndexOutcome;
use crate::message::IndexRequest;
use crate::metrics;
use crate::queue::WorkQueue;

fn check_token(state: &AppState, token: &str) -> Result<()> {
    if token != state.token {
        return Err(Unauthorized.into());
    }
    Ok(())
}

/// 立即索引一张图片
#[utoipa::path(
    post,
    path = "/index",
    request_body = IndexRequest,
    responses(
        (status = 200, body = IndexOutcome),
        (status = 400, description = "请求格式错误"),
        (status = 404, description = "无法读取图片"),
        (status = 422, description = "无法解码图片"),
    ),
    security(("token" = []))
)]
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    AuthBearer(token): AuthBearer,
    body: Bytes,
) -> Result<Json<IndexOutcome>> {
    check_token(&state, &token)?;
    let request = IndexRequest::parse(&body)?;
    Ok(Json(state.indexer.index_request(&request).await?))
}

/// 将一张图片加入索引队列
#[utoipa::path(
    post,
    path = "/enqueue",
    request_body = IndexRequest,
    responses(
        (status = 200, body = EnqueueResponse),
        (status = 400, description = "请求格式错误"),
    ),
    security(("token" = []))
)]
pub async fn enqueue_handler(
    State(state): State<Arc<AppState>>,
    AuthBearer(token): AuthBearer,
    body: Bytes,
) -> Result<Json<EnqueueResponse>> {
    check_token(&state, &token)?;
    let request = IndexRequest::parse(&body)?;
    state.queue.enqueue(&state.queue_name, &request.to_payload()).await?;
    info!("已加入队列 {}: {:?}", state.queue_name, request);
    Ok(Json(EnqueueResponse { queue: state.queue_name.clone(), picture_id: request.picture_id }))
}

/// 查询与某张图片近似重复的图片
#[utoipa::path(
    get,
    path = "/pictures/{id}/similar",
    params(("id" = i64, Path, description = "图片 ID")),
    responses((status = 200, body = SimilarResponse))
)]
pub async fn similar_handler(
    State(state): State<Arc<AppState>>,
    Path(picture_id): Path<i64>,
) -> Result<Json<SimilarResponse>> {
    let similar = state.indexer.edges_of(picture_id).await?;
    Ok(Json(SimilarResponse { picture_id, similar }))
}

/// 以 prometheus 文本格式导出指标
#[utoipa::path(get, path = "/metrics", responses((status = 200, body = String)))]
pub async fn metrics_handler() -> String {
    metrics::gather_text()
}
