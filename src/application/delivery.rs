//! Delivery Adapter - 投递音频并清理本地文件

use std::sync::Arc;

use crate::application::pipeline::remove_quietly;
use crate::application::ports::{AudioUploaderPort, UploadError};
use crate::domain::AudioArtifact;

/// 投递器
///
/// 上传一次，无论成败都删除本地文件
pub struct DeliveryAdapter {
    uploader: Arc<dyn AudioUploaderPort>,
}

impl DeliveryAdapter {
    pub fn new(uploader: Arc<dyn AudioUploaderPort>) -> Self {
        Self { uploader }
    }

    /// 消费产物。错误只用于日志，不会回传给触发方
    pub async fn deliver(&self, artifact: AudioArtifact) -> Result<(), UploadError> {
        let result = self.uploader.upload(&artifact).await;

        match &result {
            Ok(()) => tracing::info!(
                uploader = self.uploader.name(),
                chat_id = %artifact.chat_id,
                title = %artifact.title,
                "Upload success"
            ),
            Err(e) => tracing::error!(
                uploader = self.uploader.name(),
                chat_id = %artifact.chat_id,
                error = %e,
                "Upload failed"
            ),
        }

        remove_quietly(&artifact.path).await;
        result
    }
}
