//! Audio Artifact - 下载完成、待投递的音频

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::format::StreamFormat;

/// 投递目标（Telegram chat id）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl ChatId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ChatId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ChatId)
    }
}

/// 解析后的视频信息
#[derive(Debug, Clone, Default)]
pub struct VideoInfo {
    /// 视频唯一标识，用于草稿文件命名
    pub id: String,
    /// 页面地址，下载时交给提取器
    pub webpage_url: String,
    /// 原始标题
    pub title: String,
    /// 上传者 / 频道名
    pub uploader: String,
    /// 时长（秒）
    pub duration_secs: f64,
    /// 视频简介
    pub description: String,
    /// 可用流
    pub formats: Vec<StreamFormat>,
}

impl VideoInfo {
    /// 取整后的时长（秒）
    pub fn duration_whole_secs(&self) -> u32 {
        if self.duration_secs.is_finite() && self.duration_secs > 0.0 {
            self.duration_secs as u32
        } else {
            0
        }
    }
}

/// 已下载并写好标签的音频
///
/// 只被投递一次，投递后本地文件立即删除
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    /// 时长（秒）
    pub duration: u32,
    /// 说明文字，已截断
    pub caption: String,
    pub chat_id: ChatId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_parse() {
        assert_eq!("555".parse::<ChatId>().unwrap(), ChatId(555));
        assert_eq!(" -1001234 ".parse::<ChatId>().unwrap(), ChatId(-1001234));
        assert!("show-a".parse::<ChatId>().is_err());
    }

    #[test]
    fn test_duration_whole_secs() {
        let mut info = VideoInfo {
            duration_secs: 125.9,
            ..Default::default()
        };
        assert_eq!(info.duration_whole_secs(), 125);

        info.duration_secs = f64::NAN;
        assert_eq!(info.duration_whole_secs(), 0);
    }
}
