//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 端口定义（VideoResolver、MediaTagger、AudioUploader、JobScheduler）
//! - pipeline: 下载流水线
//! - delivery: 投递与清理
//! - error: 应用层错误定义

pub mod delivery;
pub mod error;
pub mod pipeline;
pub mod ports;
mod scratch_locks;

pub use delivery::DeliveryAdapter;
pub use error::PipelineError;
pub use pipeline::{Acquisition, AcquisitionPipeline, PipelineConfig};
pub use scratch_locks::{ScratchLease, ScratchLocks};

pub use ports::{
    AudioUploaderPort, DeliveryJob, DownloadError, JobSchedulerPort, MediaTaggerPort, MediaTags,
    ResolveError, SchedulerError, TagError, UploadError, VideoResolverPort,
};
