use crate::media::{FileRequest, PathResolver};
use crate::web::{
    state::AppState,
    utils::{
        errors::GatewayError, mime::MimeResolver, policy::ResponsePolicy,
        streaming::FileStreamer,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct FileQuery {
    pub path: String,
}

/// 查询参数形式：`GET /file?path=course1/intro.pdf`
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Option<Query<FileQuery>>,
) -> Result<Response, GatewayError> {
    // 缺失或无法解析的参数不向客户端暴露解析细节
    let Query(query) = query.ok_or(GatewayError::InvalidPath)?;
    serve(state, headers, FileRequest::new(query.path)).await
}

/// 路径形式：`GET /files/*path`，便于反向代理重写
pub async fn path_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    path: Option<Path<String>>,
) -> Result<Response, GatewayError> {
    let Path(path) = path.ok_or(GatewayError::InvalidPath)?;
    serve(state, headers, FileRequest::new(path)).await
}

/// 文件服务主流程：路径解析 → MIME 解析 → 响应策略 → 流式输出
///
/// 所有校验在构建任何响应头之前完成。
pub async fn serve(
    state: Arc<AppState>,
    headers: HeaderMap,
    request: FileRequest,
) -> Result<Response, GatewayError> {
    let validation_state = state.clone();
    let validation_request = request.clone();

    // 文件系统校验与嗅探为阻塞操作
    let (resolved, decision) = tokio::task::spawn_blocking(move || {
        let resolved =
            PathResolver::resolve(&validation_state.media_root, validation_request.raw())?;
        let decision = MimeResolver::new(validation_state.sniffer.as_ref())
            .resolve(validation_request.extension(), resolved.path());
        Ok::<_, GatewayError>((resolved, decision))
    })
    .await
    .map_err(|e| {
        tracing::error!("[Resolve] Validation thread failed: {}", e);
        GatewayError::ConfigError
    })??;

    tracing::debug!(
        "[Resolve] {:?} -> {} ({:?} {})",
        request.raw(),
        resolved.path().display(),
        decision.source,
        decision.mime_type
    );

    let plan = ResponsePolicy::plan(request.extension(), &decision.mime_type, resolved.len());
    FileStreamer::stream(
        resolved,
        &plan,
        request.file_name(),
        &headers,
        state.chunk_size,
    )
    .await
}
