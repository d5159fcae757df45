//! Trigger Handler
//!
//! 校验请求后立即提交任务并返回，不等待下载投递结果

use axum::{body::Bytes, extract::State};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::application::DeliveryJob;
use crate::infrastructure::http::error::{ApiError, ACCEPTED_BODY};
use crate::infrastructure::http::state::AppState;

/// 请求体
///
/// `cid` 可以是目标名称，也可以是字符串或数字形式的 chat id
#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub cid: Option<Value>,
    #[serde(default)]
    pub token: Option<String>,
}

impl TriggerRequest {
    fn cid_selector(&self) -> Option<String> {
        match self.cid.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// POST {path}
///
/// 请求体手动解析，JSON 格式错误同样返回 400
pub async fn trigger(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let request: TriggerRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid json: {}", e)))?;

    if !state.token_accepted(request.token.as_deref()) {
        return Err(ApiError::BadRequest("invalid token".to_string()));
    }

    let url = request
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing url".to_string()))?;

    let selector = request
        .cid_selector()
        .ok_or_else(|| ApiError::BadRequest("missing cid".to_string()))?;
    let chat_id = state
        .resolve_destination(&selector)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown destination: {}", selector)))?;

    let job = DeliveryJob::new(url, chat_id);
    let job_id = job.job_id;
    state.scheduler.submit(job)?;

    tracing::info!(job_id = %job_id, url = %url, chat_id = %chat_id, "Job accepted");
    Ok(ACCEPTED_BODY)
}
