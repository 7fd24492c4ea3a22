mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub use self::state::*;

#[derive(OpenApi)]
#[openapi(
    paths(api::index_handler, api::enqueue_handler, api::similar_handler, api::metrics_handler),
    components(schemas(
        crate::message::IndexRequest,
        crate::indexer::IndexOutcome,
        crate::db::Edge,
        types::EnqueueResponse,
        types::SimilarResponse,
    )),
    modifiers(&BearerToken)
)]
pub struct ApiDoc;

struct BearerToken;

impl Modify for BearerToken {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/index", post(api::index_handler))
        .route("/enqueue", post(api::enqueue_handler))
        .route("/pictures/{id}/similar", get(api::similar_handler))
        .route("/metrics", get(api::metrics_handler))
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .layer(DefaultBodyLimit::disable())
        // 请求限制：1M
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/index", "/enqueue", "/pictures/{id}/similar", "/metrics"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
