//! Telegram Bot API 类型
//!
//! 只定义用到的字段

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AudioArtifact, ChatId, MAX_CAPTION_CHARS, TRUNCATION_MARKER};

/// Bot API 错误
#[derive(Debug, Error)]
pub enum BotApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Telegram API error {code:?}: {description}")]
    Api {
        code: Option<i32>,
        description: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<reqwest::Error> for BotApiError {
    fn from(e: reqwest::Error) -> Self {
        // URL 里带 bot token，不能出现在日志里
        let e = e.without_url();
        if e.is_timeout() {
            BotApiError::Timeout
        } else if e.is_decode() {
            BotApiError::InvalidResponse(e.to_string())
        } else {
            BotApiError::NetworkError(e.to_string())
        }
    }
}

/// 统一响应包装
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i32>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, BotApiError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(BotApiError::InvalidResponse("missing result".to_string())),
            (false, _) => Err(BotApiError::Api {
                code: self.error_code,
                description: self.description.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Audio {
    pub file_id: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub performer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub audio: Option<Audio>,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub channel_post: Option<Message>,
}

impl Update {
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.channel_post.as_ref())
    }
}

/// 带上传文件的 sendAudio 参数
#[derive(Debug, Clone)]
pub struct AudioUpload<'a> {
    pub chat_id: ChatId,
    pub path: &'a std::path::Path,
    pub title: &'a str,
    pub performer: &'a str,
    pub duration: u32,
    pub caption: &'a str,
}

impl<'a> From<&'a AudioArtifact> for AudioUpload<'a> {
    fn from(a: &'a AudioArtifact) -> Self {
        Self {
            chat_id: a.chat_id,
            path: &a.path,
            title: &a.title,
            performer: &a.artist,
            duration: a.duration,
            caption: &a.caption,
        }
    }
}

/// 中转模式下说明文字里嵌入的 JSON
///
/// 中转频道收到音频后按 `channel_id` 转发，并用 `desc` 作为说明文字
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayCaption {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub desc: String,
    pub channel_id: ChatId,
}

/// 说明文字长度上限（码点）
pub const CAPTION_LIMIT: usize = MAX_CAPTION_CHARS + 1;

impl RelayCaption {
    pub fn from_artifact(a: &AudioArtifact) -> Self {
        Self {
            title: a.title.clone(),
            artist: a.artist.clone(),
            duration: a.duration,
            desc: a.caption.clone(),
            channel_id: a.chat_id,
        }
    }

    pub fn parse(caption: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(caption)
    }

    /// 序列化为 JSON，超出上限时依次缩短 `desc`、`title`、`artist`
    ///
    /// 三者都清空后 JSON 一定在上限内
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let mut caption = self.clone();
        loop {
            let json = serde_json::to_string(&caption)?;
            let len = json.chars().count();
            if len <= CAPTION_LIMIT {
                return Ok(json);
            }

            let field = if !caption.desc.is_empty() {
                &mut caption.desc
            } else if !caption.title.is_empty() {
                &mut caption.title
            } else if !caption.artist.is_empty() {
                &mut caption.artist
            } else {
                return Ok(json);
            };
            shrink(field, len - CAPTION_LIMIT);
        }
    }
}

/// 去掉至少 `over` 个码点（另留一个位置给截断标记）
fn shrink(field: &mut String, over: usize) {
    let keep = field.chars().count().saturating_sub(over + 1);
    if keep == 0 {
        field.clear();
    } else {
        let mut cut: String = field.chars().take(keep).collect();
        cut.push(TRUNCATION_MARKER);
        *field = cut;
    }
}
