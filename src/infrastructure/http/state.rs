//! Application State
//!
//! 触发接口需要的全部依赖

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::JobSchedulerPort;
use crate::domain::ChatId;

/// 应用状态
pub struct AppState {
    /// 后台任务提交端
    pub scheduler: Arc<dyn JobSchedulerPort>,
    /// 目标名称（小写）→ chat id
    pub destinations: HashMap<String, ChatId>,
    /// 共享 token，None 表示不校验
    pub api_token: Option<String>,
}

impl AppState {
    pub fn new(scheduler: Arc<dyn JobSchedulerPort>) -> Self {
        Self {
            scheduler,
            destinations: HashMap::new(),
            api_token: None,
        }
    }

    /// 配置加载时键名会被转成小写，这里统一按小写保存
    pub fn with_destinations(mut self, destinations: &HashMap<String, i64>) -> Self {
        self.destinations = destinations
            .iter()
            .map(|(name, id)| (name.to_lowercase(), ChatId(*id)))
            .collect();
        self
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }

    /// 解析目标：先查表（不区分大小写），查不到再按数字 chat id 解析
    pub fn resolve_destination(&self, selector: &str) -> Option<ChatId> {
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }
        self.destinations
            .get(&selector.to_lowercase())
            .copied()
            .or_else(|| selector.parse().ok())
    }

    pub fn token_accepted(&self, token: Option<&str>) -> bool {
        match &self.api_token {
            None => true,
            Some(expected) => token == Some(expected.as_str()),
        }
    }
}
