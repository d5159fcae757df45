//! Audio Uploaders - AudioUploaderPort 的两种实现
//!
//! - BotAudioUploader: 直接用 Bot API 上传到目标
//! - CommandAudioUploader: 用外部命令上传到中转频道，说明文字里嵌入目标

use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

use super::bot_client::TelegramBotClient;
use super::types::{AudioUpload, BotApiError, RelayCaption};
use crate::application::ports::{AudioUploaderPort, UploadError};
use crate::domain::AudioArtifact;

impl From<BotApiError> for UploadError {
    fn from(e: BotApiError) -> Self {
        match e {
            BotApiError::Timeout => UploadError::Timeout,
            BotApiError::NetworkError(msg) => UploadError::NetworkError(msg),
            BotApiError::IoError(msg) => UploadError::IoError(msg),
            other => UploadError::ApiError(other.to_string()),
        }
    }
}

/// 直接上传
pub struct BotAudioUploader {
    bot: Arc<TelegramBotClient>,
}

impl BotAudioUploader {
    pub fn new(bot: Arc<TelegramBotClient>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl AudioUploaderPort for BotAudioUploader {
    async fn upload(&self, artifact: &AudioArtifact) -> Result<(), UploadError> {
        let message = self.bot.send_audio_file(&AudioUpload::from(artifact)).await?;
        tracing::debug!(
            chat_id = %artifact.chat_id,
            message_id = message.message_id,
            "Audio sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bot"
    }
}

/// 外部上传命令配置
#[derive(Debug, Clone)]
pub struct CommandUploaderConfig {
    /// 命令名（默认 `telegram-upload`）
    pub program: String,
    /// 中转频道名
    pub helper_name: String,
}

impl Default for CommandUploaderConfig {
    fn default() -> Self {
        Self {
            program: "telegram-upload".to_string(),
            helper_name: String::new(),
        }
    }
}

/// 中转上传
///
/// 上传后由 RelayForwarder 按说明文字里的 `channel_id` 转发
pub struct CommandAudioUploader {
    config: CommandUploaderConfig,
}

impl CommandAudioUploader {
    pub fn new(config: CommandUploaderConfig) -> Self {
        Self { config }
    }

    fn build_args(&self, artifact: &AudioArtifact, caption: String) -> Vec<OsString> {
        vec![
            "--to".into(),
            self.config.helper_name.clone().into(),
            "--title".into(),
            artifact.title.clone().into(),
            "--performer".into(),
            artifact.artist.clone().into(),
            "--duration".into(),
            artifact.duration.to_string().into(),
            "--caption".into(),
            caption.into(),
            "-d".into(),
            artifact.path.clone().into_os_string(),
        ]
    }
}

#[async_trait]
impl AudioUploaderPort for CommandAudioUploader {
    async fn upload(&self, artifact: &AudioArtifact) -> Result<(), UploadError> {
        let caption = RelayCaption::from_artifact(artifact)
            .encode()
            .map_err(|e| UploadError::Serialization(e.to_string()))?;

        let output = Command::new(&self.config.program)
            .args(self.build_args(artifact, caption))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| UploadError::CommandFailed(format!("{}: {}", self.config.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(UploadError::CommandFailed(format!(
                "exit {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
