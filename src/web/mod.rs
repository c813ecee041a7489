pub mod api;
pub mod middleware;
pub mod state;
pub mod utils;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::web::{api::files, middleware::auth::auth_middleware, state::AppState};

/// 路由定义
///
/// 文件路由统一经过鉴权中间件；`/health` 不需要登录。
pub fn router(state: Arc<AppState>) -> Router {
    let file_routes = Router::new()
        .route("/file", get(files::query_handler))
        .route("/files/*path", get(files::path_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(file_routes)
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}
