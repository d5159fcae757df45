//! Domain Layer - 领域层
//!
//! 纯规则，不做 I/O:
//! - format: 音频流选择
//! - title: 标题拆分、说明文字截断
//! - artifact: 视频信息与待投递音频

mod artifact;
mod format;
mod title;

pub use artifact::{AudioArtifact, ChatId, VideoInfo};
pub use format::{select_audio_format, StreamFormat, DEFAULT_AUDIO_CODEC};
pub use title::{
    build_caption, split_title, truncate_caption, TrackTitle, MAX_CAPTION_CHARS, TITLE_SEPARATOR,
    TRUNCATION_MARKER,
};
