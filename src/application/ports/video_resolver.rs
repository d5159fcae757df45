//! Video Resolver Port - 视频信息解析与流下载抽象

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::{StreamFormat, VideoInfo};

/// 解析错误
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("Extractor failed: {0}")]
    ExtractorFailed(String),

    #[error("Invalid extractor output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 下载错误
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Downloader failed: {0}")]
    ToolFailed(String),

    #[error("Downloaded file is empty")]
    EmptyOutput,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Video Resolver Port
#[async_trait]
pub trait VideoResolverPort: Send + Sync {
    /// 解析视频元数据与可用流
    async fn resolve(&self, url: &str) -> Result<VideoInfo, ResolveError>;

    /// 把 `video` 的选中流完整写入 `dest`，返回文件大小
    ///
    /// 分片协议（HLS / DASH）也必须得到完整的音频文件。
    /// 失败时 `dest` 可能残留部分内容，由调用方清理
    async fn download(
        &self,
        video: &VideoInfo,
        format: &StreamFormat,
        dest: &Path,
    ) -> Result<u64, DownloadError>;
}
