//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, DeliveryMode};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `PODCASTBOT_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `PODCASTBOT_TELEGRAM__BOT_TOKEN=123:abc`
/// - `PODCASTBOT_SERVER__PORT=9090`
/// - `PODCASTBOT_DELIVERY__MODE=relay`
/// - `PODCASTBOT_DESTINATIONS__MORNING=-1001234567890`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 9090)?
        .set_default("server.path", "/podcast")?
        .set_default("telegram.api_base_url", "https://api.telegram.org")?
        .set_default("telegram.timeout_secs", 600)?
        .set_default("telegram.poll_timeout_secs", 60)?
        .set_default("delivery.mode", "direct")?
        .set_default("delivery.upload_command", "telegram-upload")?
        .set_default("pipeline.scratch_dir", "tmp")?
        .set_default("pipeline.audio_codec", "aac")?
        .set_default("tools.ytdlp", "yt-dlp")?
        .set_default("tools.ffmpeg", "ffmpeg")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 注意: 键名会被转换为小写，目标名称查找因此不区分大小写
    builder = builder.add_source(
        Environment::with_prefix("PODCASTBOT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.telegram.bot_token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Telegram bot token cannot be empty".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if !config.server.path.starts_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "Server path must start with '/': {}",
            config.server.path
        )));
    }

    if config.pipeline.audio_codec.is_empty() {
        return Err(ConfigError::ValidationError(
            "Audio codec cannot be empty".to_string(),
        ));
    }

    if config.delivery.mode == DeliveryMode::Relay {
        if config.delivery.helper_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "Relay delivery requires delivery.helper_name".to_string(),
            ));
        }
        if config.delivery.helper_chat_id == 0 {
            return Err(ConfigError::ValidationError(
                "Relay delivery requires delivery.helper_chat_id".to_string(),
            ));
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}{}", config.server.host, config.server.port, config.server.path);
    tracing::info!("Auth Token Required: {}", !config.auth.token.is_empty());
    tracing::info!("Bot API: {}", config.telegram.api_base_url);
    tracing::info!("Bot Timeout: {}s", config.telegram.timeout_secs);
    tracing::info!("Delivery Mode: {}", config.delivery.mode);
    if config.delivery.mode == DeliveryMode::Relay {
        tracing::info!("Relay Helper: {} ({})", config.delivery.helper_name, config.delivery.helper_chat_id);
        tracing::info!("Upload Command: {}", config.delivery.upload_command);
    }
    tracing::info!("Destinations: {}", config.destinations.len());
    tracing::info!("Scratch Directory: {:?}", config.pipeline.scratch_dir);
    tracing::info!("Audio Codec: {}", config.pipeline.audio_codec);
    tracing::info!("Tools: {} / {}", config.tools.ytdlp, config.tools.ffmpeg);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
