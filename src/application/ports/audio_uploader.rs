//! Audio Uploader Port - 音频投递抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AudioArtifact;

/// 上传错误
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Upload command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Audio Uploader Port
///
/// 单次上传尝试，不重试，不删除本地文件
#[async_trait]
pub trait AudioUploaderPort: Send + Sync {
    async fn upload(&self, artifact: &AudioArtifact) -> Result<(), UploadError>;

    /// 用于日志
    fn name(&self) -> &'static str;
}
