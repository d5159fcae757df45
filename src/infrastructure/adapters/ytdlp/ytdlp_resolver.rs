//! yt-dlp Resolver - 基于 yt-dlp 的视频解析与下载
//!
//! 实现 VideoResolverPort：
//! - `yt-dlp --dump-json --no-playlist <url>` 获取元数据和格式列表
//! - `yt-dlp -f <format_id> -o <dest> <url>` 下载选中的流（HLS / DASH 由 yt-dlp 合并）

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::application::ports::{DownloadError, ResolveError, VideoResolverPort};
use crate::domain::{StreamFormat, VideoInfo};

/// yt-dlp 输出的视频信息（只取用到的字段）
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: String,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Debug, Deserialize)]
struct YtDlpFormat {
    #[serde(default)]
    format_id: Option<String>,
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default)]
    acodec: Option<String>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    resolution: Option<String>,
    #[serde(default)]
    abr: Option<f64>,
}

/// 把 yt-dlp 的编码名归一化：`none` 为空，`mp4a.40.2` 为 `aac`，其余取第一个 `.` 之前的部分
fn normalize_codec(codec: Option<&str>) -> String {
    match codec.map(str::trim) {
        None | Some("") | Some("none") => String::new(),
        Some(c) if c.starts_with("mp4a") => "aac".to_string(),
        Some(c) => c.split('.').next().unwrap_or(c).to_lowercase(),
    }
}

fn normalize_resolution(resolution: Option<&str>) -> String {
    match resolution.map(str::trim) {
        None | Some("audio only") => String::new(),
        Some(r) => r.to_string(),
    }
}

impl From<YtDlpFormat> for StreamFormat {
    fn from(f: YtDlpFormat) -> Self {
        StreamFormat {
            format_id: f.format_id.unwrap_or_default(),
            audio_encoding: normalize_codec(f.acodec.as_deref()),
            video_encoding: normalize_codec(f.vcodec.as_deref()),
            resolution: normalize_resolution(f.resolution.as_deref()),
            audio_bitrate: f.abr.filter(|b| b.is_finite() && *b > 0.0).map(|b| b.round() as u32).unwrap_or(0),
            protocol: f.protocol.unwrap_or_default(),
        }
    }
}

/// 解析 `--dump-json` 输出
///
/// 输出里没有 `webpage_url` 时用请求的地址
fn parse_info(json: &[u8], requested_url: &str) -> Result<VideoInfo, ResolveError> {
    let info: YtDlpInfo =
        serde_json::from_slice(json).map_err(|e| ResolveError::InvalidOutput(e.to_string()))?;

    if info.id.is_empty() {
        return Err(ResolveError::InvalidOutput("empty video id".to_string()));
    }

    let uploader = info
        .uploader
        .filter(|u| !u.is_empty())
        .or(info.channel)
        .unwrap_or_default();

    Ok(VideoInfo {
        id: info.id,
        webpage_url: info
            .webpage_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| requested_url.to_string()),
        title: info.title.unwrap_or_default(),
        uploader,
        duration_secs: info.duration.unwrap_or(0.0),
        description: info.description.unwrap_or_default(),
        formats: info.formats.into_iter().map(StreamFormat::from).collect(),
    })
}

/// yt-dlp 的输出模板里 `%` 有特殊含义
fn output_template(dest: &Path) -> OsString {
    dest.to_string_lossy().replace('%', "%%").into()
}

/// yt-dlp 解析器配置
#[derive(Debug, Clone)]
pub struct YtDlpResolverConfig {
    /// yt-dlp 可执行文件
    pub program: String,
}

impl Default for YtDlpResolverConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
        }
    }
}

/// yt-dlp 解析器
pub struct YtDlpResolver {
    config: YtDlpResolverConfig,
}

impl YtDlpResolver {
    pub fn new(config: YtDlpResolverConfig) -> Self {
        Self { config }
    }

    fn download_args(url: &str, format: &StreamFormat, dest: &Path) -> Vec<OsString> {
        vec![
            "-f".into(),
            format.format_id.clone().into(),
            "-o".into(),
            output_template(dest),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--no-part".into(),
            "--no-progress".into(),
            "--force-overwrites".into(),
            "--".into(),
            url.into(),
        ]
    }
}

#[async_trait]
impl VideoResolverPort for YtDlpResolver {
    async fn resolve(&self, url: &str) -> Result<VideoInfo, ResolveError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ResolveError::InvalidUrl(url.to_string()));
        }

        tracing::debug!(url = %url, program = %self.config.program, "Extracting video info");

        let output = Command::new(&self.config.program)
            .args(["--dump-json", "--no-playlist", "--no-warnings", "--", url])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ResolveError::IoError(format!("{}: {}", self.config.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ResolveError::ExtractorFailed(stderr.trim().to_string()));
        }

        let info = parse_info(&output.stdout, url)?;

        tracing::debug!(
            video_id = %info.id,
            formats = info.formats.len(),
            "Video info extracted"
        );

        Ok(info)
    }

    async fn download(
        &self,
        video: &VideoInfo,
        format: &StreamFormat,
        dest: &Path,
    ) -> Result<u64, DownloadError> {
        if format.format_id.is_empty() {
            return Err(DownloadError::ToolFailed(format!(
                "{} - selected format has no id",
                video.id
            )));
        }

        let output = Command::new(&self.config.program)
            .args(Self::download_args(&video.webpage_url, format, dest))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DownloadError::IoError(format!("{}: {}", self.config.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::ToolFailed(format!(
                "exit {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let size = match tokio::fs::metadata(dest).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(DownloadError::IoError(e.to_string())),
        };
        if size == 0 {
            return Err(DownloadError::EmptyOutput);
        }

        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::select_audio_format;

    const SAMPLE: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "title": "Morning Show/Season 2/Episode 14",
        "uploader": "Radio Channel",
        "duration": 212.4,
        "description": "Notes",
        "formats": [
            {"format_id": "139", "protocol": "https", "acodec": "mp4a.40.5", "vcodec": "none",
             "resolution": "audio only", "abr": 48.8},
            {"format_id": "140", "protocol": "https", "acodec": "mp4a.40.2", "vcodec": "none",
             "resolution": "audio only", "abr": 129.5},
            {"format_id": "251", "protocol": "https", "acodec": "opus", "vcodec": "none",
             "resolution": "audio only", "abr": 160.0},
            {"format_id": "137", "protocol": "https", "acodec": "none", "vcodec": "avc1.640028",
             "resolution": "1920x1080", "abr": null},
            {"format_id": "18", "protocol": "https", "acodec": "mp4a.40.2", "vcodec": "avc1.42001E",
             "resolution": "640x360", "abr": 96}
        ]
    }"#;

    /// 只有分片流可选的直播回放
    const HLS_ONLY: &str = r#"{
        "id": "live42",
        "title": "Replay",
        "formats": [
            {"format_id": "hls-1080p", "protocol": "m3u8_native", "acodec": "mp4a.40.2",
             "vcodec": "avc1.64002a", "resolution": "1920x1080"},
            {"format_id": "hls-audio-128", "protocol": "m3u8_native", "acodec": "mp4a.40.2",
             "vcodec": "none", "resolution": "audio only", "abr": 128}
        ]
    }"#;

    #[cfg(unix)]
    fn fake_ytdlp(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// 记录参数，并往 `-o` 指定的路径写入固定内容
    #[cfg(unix)]
    const WRITES_AUDIO: &str = r#"
echo "$@" > "$(dirname "$0")/args.txt"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-o" ]; then out="$2"; fi
  shift
done
printf 'AUDIODATA' > "$out"
"#;

    #[test]
    fn test_parse_info() {
        let info = parse_info(SAMPLE.as_bytes(), "https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(info.id, "dQw4w9WgXcQ");
        assert_eq!(info.webpage_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(info.uploader, "Radio Channel");
        assert_eq!(info.duration_whole_secs(), 212);
        assert_eq!(info.formats.len(), 5);

        let f139 = &info.formats[0];
        assert_eq!(f139.audio_encoding, "aac");
        assert!(f139.video_encoding.is_empty());
        assert!(f139.resolution.is_empty());
        assert_eq!(f139.audio_bitrate, 49);
        assert_eq!(f139.protocol, "https");

        let f137 = &info.formats[3];
        assert!(f137.audio_encoding.is_empty());
        assert_eq!(f137.video_encoding, "avc1");
        assert_eq!(f137.audio_bitrate, 0);
    }

    #[test]
    fn test_parsed_formats_select_best_aac() {
        let info = parse_info(SAMPLE.as_bytes(), "https://youtu.be/x").unwrap();
        let best = select_audio_format(&info.formats, "aac").unwrap();
        assert_eq!(best.format_id, "140");
    }

    #[test]
    fn test_uploader_falls_back_to_channel() {
        let info =
            parse_info(br#"{"id": "x", "uploader": null, "channel": "Chan"}"#, "https://v/x").unwrap();
        assert_eq!(info.uploader, "Chan");
        assert_eq!(info.webpage_url, "https://v/x");
        assert!(info.title.is_empty());
        assert!(info.formats.is_empty());
    }

    #[test]
    fn test_invalid_output() {
        assert!(matches!(parse_info(b"not json", ""), Err(ResolveError::InvalidOutput(_))));
        assert!(matches!(parse_info(br#"{"id": ""}"#, ""), Err(ResolveError::InvalidOutput(_))));
    }

    #[test]
    fn test_normalize_codec() {
        assert_eq!(normalize_codec(None), "");
        assert_eq!(normalize_codec(Some("none")), "");
        assert_eq!(normalize_codec(Some("mp4a.40.2")), "aac");
        assert_eq!(normalize_codec(Some("opus")), "opus");
        assert_eq!(normalize_codec(Some("avc1.4d401f")), "avc1");
    }

    #[test]
    fn test_download_args_hand_format_to_ytdlp() {
        let format = StreamFormat {
            format_id: "140".to_string(),
            ..Default::default()
        };
        let args: Vec<String> = YtDlpResolver::download_args(
            "https://example/video123",
            &format,
            Path::new("tmp/100%_live.m4a"),
        )
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

        assert_eq!(&args[..4], ["-f", "140", "-o", "tmp/100%%_live.m4a"]);
        assert_eq!(&args[args.len() - 2..], ["--", "https://example/video123"]);
    }

    #[tokio::test]
    async fn test_resolve_rejects_non_http_url() {
        let resolver = YtDlpResolver::new(YtDlpResolverConfig::default());
        let err = resolver.resolve("ftp://example/video").await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidUrl(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_segmented_format_downloaded_by_ytdlp() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = YtDlpResolver::new(YtDlpResolverConfig {
            program: fake_ytdlp(dir.path(), WRITES_AUDIO),
        });

        let video = parse_info(HLS_ONLY.as_bytes(), "https://example/live42").unwrap();
        let format = select_audio_format(&video.formats, "aac").unwrap();
        assert_eq!(format.protocol, "m3u8_native");

        let dest = dir.path().join("live42.m4a");
        let size = resolver.download(&video, format, &dest).await.unwrap();

        assert_eq!(size, 9);
        assert_eq!(std::fs::read(&dest).unwrap(), b"AUDIODATA");
        let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert!(args.starts_with("-f hls-audio-128 -o "));
        assert!(args.trim_end().ends_with("-- https://example/live42"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = YtDlpResolver::new(YtDlpResolverConfig {
            program: fake_ytdlp(dir.path(), "echo 'ERROR: HTTP Error 403: Forbidden' >&2\nexit 1"),
        });
        let video = parse_info(HLS_ONLY.as_bytes(), "https://example/live42").unwrap();

        let err = resolver
            .download(&video, &video.formats[1], &dir.path().join("live42.m4a"))
            .await
            .unwrap_err();
        match err {
            DownloadError::ToolFailed(msg) => assert!(msg.contains("403")),
            other => panic!("unexpected: {}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_without_output_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = YtDlpResolver::new(YtDlpResolverConfig {
            program: fake_ytdlp(dir.path(), "exit 0"),
        });
        let video = parse_info(HLS_ONLY.as_bytes(), "https://example/live42").unwrap();

        let err = resolver
            .download(&video, &video.formats[1], &dir.path().join("live42.m4a"))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::EmptyOutput));
    }
}
