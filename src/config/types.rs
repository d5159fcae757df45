//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 触发接口鉴权
    #[serde(default)]
    pub auth: AuthConfig,

    /// Telegram Bot 配置
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// 投递配置
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// 目标频道表：名称 → chat id
    #[serde(default)]
    pub destinations: HashMap<String, i64>,

    /// 下载流水线配置
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// 外部工具
    #[serde(default)]
    pub tools: ToolsConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 触发接口路径
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9090
}

fn default_path() -> String {
    "/podcast".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 鉴权配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// 共享 token，为空时不校验
    #[serde(default)]
    pub token: String,
}

impl AuthConfig {
    pub fn required_token(&self) -> Option<String> {
        if self.token.is_empty() {
            None
        } else {
            Some(self.token.clone())
        }
    }
}

/// Telegram Bot 配置
#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token
    #[serde(default)]
    pub bot_token: String,

    /// Bot API 地址（可指向自建 Bot API 服务）
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// 请求超时时间（秒），包括上传
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 中转模式 getUpdates 长轮询时间（秒）
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_timeout() -> u64 {
    600 // 大文件上传
}

fn default_poll_timeout() -> u64 {
    60
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

/// 投递方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Bot 直接上传到目标
    #[default]
    Direct,
    /// 外部命令上传到中转频道，再由 Bot 转发
    Relay,
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMode::Direct => write!(f, "direct"),
            DeliveryMode::Relay => write!(f, "relay"),
        }
    }
}

/// 投递配置
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub mode: DeliveryMode,

    /// 中转频道名（上传命令的 `--to`）
    #[serde(default)]
    pub helper_name: String,

    /// 中转频道 chat id（转发器只处理这里的消息）
    #[serde(default)]
    pub helper_chat_id: i64,

    /// 上传命令
    #[serde(default = "default_upload_command")]
    pub upload_command: String,
}

fn default_upload_command() -> String {
    "telegram-upload".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::default(),
            helper_name: String::new(),
            helper_chat_id: 0,
            upload_command: default_upload_command(),
        }
    }
}

/// 下载流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 草稿目录
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// 目标音频编码
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            audio_codec: default_audio_codec(),
        }
    }
}

/// 外部工具路径
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_ytdlp")]
    pub ytdlp: String,

    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
}

fn default_ytdlp() -> String {
    "yt-dlp".to_string()
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp: default_ytdlp(),
            ffmpeg: default_ffmpeg(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.path, "/podcast");
        assert_eq!(config.delivery.mode, DeliveryMode::Direct);
        assert_eq!(config.pipeline.scratch_dir, PathBuf::from("tmp"));
        assert_eq!(config.pipeline.audio_codec, "aac");
        assert!(config.destinations.is_empty());
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:9090");
    }

    #[test]
    fn test_required_token() {
        assert_eq!(AuthConfig::default().required_token(), None);
        let auth = AuthConfig {
            token: "s3cret".to_string(),
        };
        assert_eq!(auth.required_token().as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_telegram_debug_hides_token() {
        let config = TelegramConfig {
            bot_token: "123:secret".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
