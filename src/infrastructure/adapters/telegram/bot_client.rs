//! Telegram Bot Client - 调用 Telegram Bot API
//!
//! 用到的方法：
//! - getMe       启动时校验 token
//! - sendAudio   multipart 上传本地文件，或按 file_id 转发
//! - getUpdates  长轮询（中转模式）

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;

use super::types::{ApiResponse, AudioUpload, BotApiError, Message, Update, User};
use crate::domain::ChatId;

/// Bot 客户端配置
#[derive(Clone)]
pub struct TelegramBotClientConfig {
    /// API 基础 URL
    pub api_base_url: String,
    /// Bot token
    pub bot_token: String,
    /// 普通请求超时时间（秒），包括上传
    pub timeout_secs: u64,
}

impl std::fmt::Debug for TelegramBotClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBotClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("bot_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for TelegramBotClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            timeout_secs: 600,
        }
    }
}

impl TelegramBotClientConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
struct SendAudioById<'a> {
    chat_id: i64,
    audio: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    caption: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

/// 按扩展名取音频 MIME 类型
fn audio_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("m4a") | Some("mp4") | Some("aac") => "audio/mp4",
        Some("webm") => "audio/webm",
        Some("mp3") => "audio/mpeg",
        Some("ogg") | Some("opus") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

/// 中转转发用到的 Bot 能力
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, BotApiError>;

    async fn send_audio_by_id(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
    ) -> Result<Message, BotApiError>;
}

/// Telegram Bot 客户端
pub struct TelegramBotClient {
    client: Client,
    config: TelegramBotClientConfig,
}

impl TelegramBotClient {
    pub fn new(config: TelegramBotClientConfig) -> Result<Self, BotApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(BotApiError::from)?;

        Ok(Self { client, config })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    /// 发送请求并解包 `{ok, result}`
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BotApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let parsed: ApiResponse<T> = serde_json::from_slice(&body).map_err(|e| {
            BotApiError::InvalidResponse(format!("HTTP {}: {}", status, e))
        })?;

        parsed.into_result()
    }

    /// 校验 token，返回 bot 自身信息
    pub async fn get_me(&self) -> Result<User, BotApiError> {
        self.call(self.client.get(self.method_url("getMe"))).await
    }

    /// 上传本地音频文件
    pub async fn send_audio_file(&self, upload: &AudioUpload<'_>) -> Result<Message, BotApiError> {
        let file = tokio::fs::File::open(upload.path)
            .await
            .map_err(|e| BotApiError::IoError(format!("{}: {}", upload.path.display(), e)))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| BotApiError::IoError(e.to_string()))?
            .len();

        let file_name = upload
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.m4a".to_string());

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
            .file_name(file_name)
            .mime_str(audio_mime(upload.path))
            .map_err(BotApiError::from)?;

        let form = Form::new()
            .text("chat_id", upload.chat_id.to_string())
            .text("title", upload.title.to_string())
            .text("performer", upload.performer.to_string())
            .text("duration", upload.duration.to_string())
            .text("caption", upload.caption.to_string())
            .part("audio", part);

        tracing::debug!(
            chat_id = %upload.chat_id,
            path = %upload.path.display(),
            size = len,
            "Sending audio"
        );

        self.call(self.client.post(self.method_url("sendAudio")).multipart(form))
            .await
    }
}

#[async_trait]
impl BotApi for TelegramBotClient {
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, BotApiError> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message", "channel_post"],
        };

        // 长轮询需要比服务端等待时间更长的超时
        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(timeout_secs + 10))
            .json(&body);

        self.call(request).await
    }

    async fn send_audio_by_id(
        &self,
        chat_id: ChatId,
        file_id: &str,
        caption: &str,
    ) -> Result<Message, BotApiError> {
        let body = SendAudioById {
            chat_id: chat_id.as_i64(),
            audio: file_id,
            caption,
        };

        self.call(self.client.post(self.method_url("sendAudio")).json(&body))
            .await
    }
}
