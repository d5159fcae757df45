//! Worker Layer - 后台任务
//!
//! - JobWorker: 下载 → 投递
//! - RelayForwarder: 中转模式的转发循环

mod job_worker;
mod relay_forwarder;

pub use job_worker::{process_job, JobDispatcher, JobWorker};
pub use relay_forwarder::{RelayForwarder, RelayForwarderConfig};
