//! Media Tagger Port - 容器元数据改写抽象

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// 标签改写错误
#[derive(Debug, Error)]
pub enum TagError {
    #[error("Failed to spawn tagger: {0}")]
    SpawnFailed(String),

    #[error("Tagger exited with {code:?}: {stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },
}

/// 要写入的标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTags {
    pub title: String,
    pub artist: String,
    pub album: String,
}

/// Media Tagger Port
///
/// 实现必须原样复制音频流，不重新编码
#[async_trait]
pub trait MediaTaggerPort: Send + Sync {
    /// 读取 `input`，写出带标签的 `output`
    async fn tag(&self, input: &Path, output: &Path, tags: &MediaTags) -> Result<(), TagError>;
}
