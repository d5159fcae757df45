//! Stream Format - 音频流选择
//!
//! 从视频的可用编码中选出纯音频、码率最高的一路

/// 默认目标音频编码（m4a 容器内的 AAC）
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// 视频的一路可用流
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamFormat {
    /// 提取器内部的格式编号
    pub format_id: String,
    /// 音频编码名称，无音轨时为空
    pub audio_encoding: String,
    /// 视频编码名称，纯音频流为空
    pub video_encoding: String,
    /// 分辨率标记，纯音频流为空
    pub resolution: String,
    /// 音频码率（kbit/s）
    pub audio_bitrate: u32,
    /// 传输协议（https / m3u8_native / http_dash_segments ...），只用于日志
    pub protocol: String,
}

impl StreamFormat {
    /// 是否为指定编码的纯音频流
    pub fn is_audio_only(&self, codec: &str) -> bool {
        self.audio_encoding == codec && self.video_encoding.is_empty() && self.resolution.is_empty()
    }
}

/// 选出码率最高的纯音频流
///
/// 码率相同时取先出现的一项。没有符合条件的流时返回 `None`，
/// 调用方必须放弃本次请求。
pub fn select_audio_format<'a>(formats: &'a [StreamFormat], codec: &str) -> Option<&'a StreamFormat> {
    let mut candidates: Vec<&StreamFormat> =
        formats.iter().filter(|f| f.is_audio_only(codec)).collect();

    // sort_by 是稳定排序
    candidates.sort_by(|a, b| b.audio_bitrate.cmp(&a.audio_bitrate));
    candidates.into_iter().next()
}
