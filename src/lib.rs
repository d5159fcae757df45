//! Podcastbot - 视频转音频投递到 Telegram
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 流格式选择、标题拆分、说明文字截断
//!
//! 应用层 (application/):
//! - Ports: VideoResolver, MediaTagger, AudioUploader, JobScheduler
//! - AcquisitionPipeline: 解析 → 选流 → 下载 → 写标签
//! - DeliveryAdapter: 上传后清理草稿文件
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 触发接口
//! - Worker: JobWorker、RelayForwarder
//! - Adapters: yt-dlp、ffmpeg、Telegram Bot API、外部上传命令

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
