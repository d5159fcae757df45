//! HTTP Error Handling
//!
//! 触发接口只返回纯文本：`ok` / `bad request`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// 拒绝请求时的响应体
pub const BAD_REQUEST_BODY: &str = "bad request";

/// 接受请求时的响应体
pub const ACCEPTED_BODY: &str = "ok";

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    /// 字段缺失、token 错误、JSON 格式错误
    BadRequest(String),
    /// 后台 Worker 不可用
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, BAD_REQUEST_BODY).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}

impl From<crate::application::SchedulerError> for ApiError {
    fn from(e: crate::application::SchedulerError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
