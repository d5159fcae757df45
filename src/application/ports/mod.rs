//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_uploader;
mod job_scheduler;
mod media_tagger;
mod video_resolver;

pub use audio_uploader::{AudioUploaderPort, UploadError};
pub use job_scheduler::{DeliveryJob, JobSchedulerPort, SchedulerError};
pub use media_tagger::{MediaTaggerPort, MediaTags, TagError};
pub use video_resolver::{DownloadError, ResolveError, VideoResolverPort};
