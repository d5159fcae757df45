//! Job Scheduler Port - 后台任务提交
//!
//! 触发端点只负责提交，不等待、不回报结果

use thiserror::Error;
use uuid::Uuid;

use crate::domain::ChatId;

/// 调度错误
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Worker is not running")]
    WorkerStopped,
}

/// 一次下载 + 投递任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryJob {
    pub job_id: Uuid,
    pub url: String,
    pub chat_id: ChatId,
}

impl DeliveryJob {
    pub fn new(url: impl Into<String>, chat_id: ChatId) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            url: url.into(),
            chat_id,
        }
    }
}

/// Job Scheduler Port
pub trait JobSchedulerPort: Send + Sync {
    /// 提交后立即返回；任务至多执行一次
    fn submit(&self, job: DeliveryJob) -> Result<(), SchedulerError>;
}
