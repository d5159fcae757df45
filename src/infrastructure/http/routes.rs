//! HTTP Routes
//!
//! - {path}   POST  提交下载投递任务（默认 /podcast）
//! - /ping    GET   健康检查

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes(trigger_path: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(trigger_path, post(handlers::trigger))
        .route("/ping", get(handlers::ping))
}
