use crate::web::{state::AppState, utils::errors::GatewayError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// 鉴权中间件
///
/// 职责：调用宿主会话服务确认调用方已登录。
/// 前置条件：必须挂载在文件路由之前，未登录请求不会触发任何文件系统访问。
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let headers = req.headers().clone();
    let auth_result = state.authenticator.authenticate(&headers).await;

    match auth_result {
        Ok(identity) => {
            tracing::debug!("[Auth] Authenticated: {}", identity.subject);
            next.run(req).await
        }
        Err(denied) => {
            tracing::warn!("[Auth] Denied: {} {}", req.method(), req.uri().path());
            GatewayError::from(denied).into_response()
        }
    }
}
