//! 应用层错误定义
//!
//! 下载流水线的终止性错误，全部不重试

use thiserror::Error;

use crate::application::ports::{DownloadError, ResolveError};

/// 流水线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 链接无效 / 网络 / 提取器失败
    #[error("Failed to resolve video info for {url}: {source}")]
    Resolve {
        url: String,
        #[source]
        source: ResolveError,
    },

    /// 没有纯音频流
    #[error("{video_id} - no {codec} audio-only format available")]
    NoAudioFormat { video_id: String, codec: String },

    /// 下载失败（部分文件已删除）
    #[error("{video_id} - failed to download audio: {source}")]
    Download {
        video_id: String,
        #[source]
        source: DownloadError,
    },
}

impl PipelineError {
    /// 用于日志字段
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Resolve { .. } => "resolve",
            PipelineError::NoAudioFormat { .. } => "no_audio_format",
            PipelineError::Download { .. } => "download",
        }
    }
}
