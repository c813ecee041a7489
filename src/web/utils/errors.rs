use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::auth::AccessDenied;
use crate::media::MediaError;

pub const CODE_INTERNAL: &str = "GW-500";
pub const CODE_BAD_REQUEST: &str = "GW-400";
pub const CODE_NOT_FOUND: &str = "GW-404";
pub const CODE_UNAUTHORIZED: &str = "GW-401";

/// 对外可见的错误分类
///
/// 只携带安全的通用文案，具体原因只写入日志。
#[derive(Debug)]
pub enum GatewayError {
    InvalidPath,
    NotFound,
    AccessDenied { login_url: Option<String> },
    ConfigError,
}

impl From<MediaError> for GatewayError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidPath => GatewayError::InvalidPath,
            MediaError::NotFound => GatewayError::NotFound,
            MediaError::Config(details) => {
                tracing::error!("[Config] Media root unavailable: {}", details);
                GatewayError::ConfigError
            }
        }
    }
}

impl From<AccessDenied> for GatewayError {
    fn from(denied: AccessDenied) -> Self {
        GatewayError::AccessDenied {
            login_url: denied.login_url,
        }
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidPath => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::AccessDenied { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code_and_message(&self) -> (&'static str, &'static str) {
        match self {
            GatewayError::InvalidPath => (CODE_BAD_REQUEST, "Invalid request"),
            GatewayError::NotFound => (CODE_NOT_FOUND, "Not found"),
            GatewayError::AccessDenied { .. } => (CODE_UNAUTHORIZED, "Authentication required"),
            GatewayError::ConfigError => (CODE_INTERNAL, "Internal error"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::AccessDenied {
            login_url: Some(url),
        } = &self
        {
            return (StatusCode::FOUND, [(header::LOCATION, url.clone())]).into_response();
        }

        let (code, message) = self.code_and_message();
        (
            self.status(),
            [(header::CACHE_CONTROL, "no-store")],
            Json(error_json(code, message)),
        )
            .into_response()
    }
}

pub fn error_json(code: &str, safe_message: &str) -> Value {
    serde_json::json!({
        "status": "error",
        "code": code,
        "message": safe_message
    })
}
