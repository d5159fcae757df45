//! Tagger Adapter - ffmpeg 元数据写入

mod ffmpeg_tagger;

pub use ffmpeg_tagger::FfmpegTagger;
