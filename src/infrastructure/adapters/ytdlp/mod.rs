//! yt-dlp Adapter - 视频解析与下载

mod ytdlp_resolver;

pub use ytdlp_resolver::{YtDlpResolver, YtDlpResolverConfig};
