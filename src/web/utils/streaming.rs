use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use std::io::SeekFrom;
use std::path::PathBuf;
use tokio::fs::File as TokioFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::errors::GatewayError;
use super::policy::ResponsePlan;
use crate::media::ResolvedFile;

/// Range 头解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    Full,
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// 文件流式输出层
///
/// 职责：在所有校验完成后一次性构建响应头，再按块流式输出文件内容。
/// 响应头一旦返回即视为已提交，之后的读取错误只记录日志并中断连接。
pub struct FileStreamer;

impl FileStreamer {
    pub async fn stream(
        resolved: ResolvedFile,
        plan: &ResponsePlan,
        file_name: &str,
        headers: &HeaderMap,
        chunk_size: usize,
    ) -> Result<Response, GatewayError> {
        let etag = etag_for(&resolved);

        // 浏览器端缓存校验
        if if_none_match_hits(headers, &etag) {
            return Ok((
                StatusCode::NOT_MODIFIED,
                [
                    (header::ETAG, etag),
                    (
                        header::CACHE_CONTROL,
                        plan.cache_policy.header_value().to_string(),
                    ),
                    (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
                ],
            )
                .into_response());
        }

        let file_size = plan.content_length;
        let range = headers
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok())
            .map(|value| parse_range(value, file_size))
            .unwrap_or(RangeRequest::Full);

        let (status, start, length) = match range {
            RangeRequest::Full => (StatusCode::OK, 0, file_size),
            RangeRequest::Partial { start, end } => {
                (StatusCode::PARTIAL_CONTENT, start, end - start + 1)
            }
            RangeRequest::Unsatisfiable => {
                return Ok((
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [
                        (header::CONTENT_RANGE, format!("bytes */{}", file_size)),
                        (
                            header::CACHE_CONTROL,
                            plan.cache_policy.header_value().to_string(),
                        ),
                        (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
                    ],
                )
                    .into_response());
            }
        };

        let content_type = HeaderValue::from_str(&plan.mime_type).map_err(|_| {
            tracing::error!("[Stream] Unusable content type {:?}", plan.mime_type);
            GatewayError::ConfigError
        })?;

        // 直接使用校验阶段打开的句柄，避免按路径二次解析
        let path_for_log = resolved.path().to_path_buf();
        let mut file = TokioFile::from_std(resolved.into_file());
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await.map_err(|e| {
                tracing::error!("[Stream] Seek failed: {}", e);
                GatewayError::NotFound
            })?;
        }

        let mut builder = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, length.to_string())
            .header(
                header::CONTENT_DISPOSITION,
                plan.content_disposition(file_name),
            )
            .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
            .header(header::CACHE_CONTROL, plan.cache_policy.header_value())
            .header(header::ETAG, etag)
            .header(header::ACCEPT_RANGES, "bytes");
        if status == StatusCode::PARTIAL_CONTENT {
            builder = builder.header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, start + length - 1, file_size),
            );
        }

        let body = file_body(file.take(length), chunk_size, path_for_log);
        builder.body(body).map_err(|e| {
            tracing::error!("[Stream] Failed to build response: {}", e);
            GatewayError::ConfigError
        })
    }
}

/// 按块读取的响应体
///
/// 读取失败时记录日志，流在返回该错误后结束，连接随之中断。
fn file_body<R>(reader: R, chunk_size: usize, path_for_log: PathBuf) -> Body
where
    R: AsyncRead + Send + 'static,
{
    let stream = ReaderStream::with_capacity(reader, chunk_size).inspect(move |chunk| {
        if let Err(e) = chunk {
            tracing::error!(
                "[Stream] Transfer aborted for {}: {}",
                path_for_log.display(),
                e
            );
        }
    });
    Body::from_stream(stream)
}

/// ETag：基于文件大小和修改时间
fn etag_for(resolved: &ResolvedFile) -> String {
    let mtime = resolved
        .modified()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(r#""{:x}-{:x}""#, resolved.len(), mtime)
}

fn if_none_match_hits(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|candidate| candidate.trim())
        .any(|candidate| {
            candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
        })
}

/// 解析单段 `Range: bytes=...`，多段或格式错误时按完整响应处理
pub fn parse_range(value: &str, file_size: u64) -> RangeRequest {
    let ranges = match value.trim().strip_prefix("bytes=") {
        Some(ranges) if !ranges.contains(',') => ranges,
        _ => return RangeRequest::Full,
    };
    let (raw_start, raw_end) = match ranges.split_once('-') {
        Some((s, e)) => (s.trim(), e.trim()),
        None => return RangeRequest::Full,
    };

    if raw_start.is_empty() {
        let suffix = match raw_end.parse::<u64>() {
            Ok(n) => n,
            Err(_) => return RangeRequest::Full,
        };
        if suffix == 0 || file_size == 0 {
            return RangeRequest::Unsatisfiable;
        }
        return RangeRequest::Partial {
            start: file_size.saturating_sub(suffix),
            end: file_size - 1,
        };
    }

    let start = match raw_start.parse::<u64>() {
        Ok(s) => s,
        Err(_) => return RangeRequest::Full,
    };
    let end = if raw_end.is_empty() {
        None
    } else {
        match raw_end.parse::<u64>() {
            Ok(e) => Some(e),
            Err(_) => return RangeRequest::Full,
        }
    };
    if start >= file_size {
        return RangeRequest::Unsatisfiable;
    }
    let end = end.unwrap_or(file_size - 1);
    if end < start {
        return RangeRequest::Full;
    }
    RangeRequest::Partial {
        start,
        end: end.min(file_size - 1),
    }
}
