//! Acquisition Pipeline - 解析 → 选流 → 下载 → 写标签
//!
//! 任何一步失败都直接放弃本次请求，不重试。写标签失败不算失败。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::application::error::PipelineError;
use crate::application::ports::{MediaTaggerPort, MediaTags, VideoResolverPort};
use crate::application::scratch_locks::{ScratchLease, ScratchLocks};
use crate::domain::{
    build_caption, select_audio_format, split_title, AudioArtifact, ChatId, DEFAULT_AUDIO_CODEC,
};

/// 流水线配置
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 草稿目录（启动时已创建）
    pub scratch_dir: PathBuf,
    /// 目标音频编码
    pub audio_codec: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("tmp"),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = codec.into();
        self
    }

    fn extension(&self) -> &'static str {
        match self.audio_codec.as_str() {
            "opus" | "vorbis" => "webm",
            "mp3" => "mp3",
            _ => "m4a",
        }
    }

    /// 最终文件路径：`{scratch}/{id}.m4a`
    pub fn audio_path(&self, video_id: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("{}.{}", sanitize_id(video_id), self.extension()))
    }

    /// 写标签的中间文件：`{scratch}/{id}-new.m4a`
    pub fn tagged_path(&self, video_id: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("{}-new.{}", sanitize_id(video_id), self.extension()))
    }
}

/// 只保留文件名安全的字符
fn sanitize_id(video_id: &str) -> String {
    video_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// 流水线产物
///
/// `lease` 持有该视频的草稿文件锁，投递完成后再释放
#[derive(Debug)]
pub struct Acquisition {
    pub artifact: AudioArtifact,
    pub lease: ScratchLease,
}

/// 下载流水线
pub struct AcquisitionPipeline {
    config: PipelineConfig,
    resolver: Arc<dyn VideoResolverPort>,
    tagger: Arc<dyn MediaTaggerPort>,
    locks: ScratchLocks,
}

impl AcquisitionPipeline {
    pub fn new(
        config: PipelineConfig,
        resolver: Arc<dyn VideoResolverPort>,
        tagger: Arc<dyn MediaTaggerPort>,
    ) -> Self {
        Self {
            config,
            resolver,
            tagger,
            locks: ScratchLocks::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn acquire(&self, url: &str, chat_id: ChatId) -> Result<Acquisition, PipelineError> {
        // 1. 解析视频信息
        let video = self
            .resolver
            .resolve(url)
            .await
            .map_err(|source| PipelineError::Resolve {
                url: url.to_string(),
                source,
            })?;

        // 2. 选流
        let format = select_audio_format(&video.formats, &self.config.audio_codec)
            .ok_or_else(|| PipelineError::NoAudioFormat {
                video_id: video.id.clone(),
                codec: self.config.audio_codec.clone(),
            })?;

        tracing::debug!(
            video_id = %video.id,
            format_id = %format.format_id,
            protocol = %format.protocol,
            audio_bitrate = format.audio_bitrate,
            "Selected audio format"
        );

        // 3. 下载
        let lease = self.locks.lock(&video.id).await;
        let path = self.config.audio_path(&video.id);

        match self.resolver.download(&video, format, &path).await {
            Ok(bytes) => {
                tracing::info!(video_id = %video.id, bytes, path = %path.display(), "Audio downloaded");
            }
            Err(source) => {
                remove_quietly(&path).await;
                return Err(PipelineError::Download {
                    video_id: video.id.clone(),
                    source,
                });
            }
        }

        // 4. 拆分标题
        let track = split_title(&video.title);

        // 5. 写标签（尽力而为）
        let tags = MediaTags {
            title: track.title.clone(),
            artist: video.uploader.clone(),
            album: track.album,
        };
        self.apply_tags(&video.id, &path, &tags).await;

        // 6. 组装产物
        let artifact = AudioArtifact {
            path,
            title: track.title,
            artist: video.uploader.clone(),
            duration: video.duration_whole_secs(),
            caption: build_caption(&video.title, &video.description),
            chat_id,
        };

        Ok(Acquisition { artifact, lease })
    }

    /// 成功时用带标签的文件替换原文件，失败时保留原文件
    async fn apply_tags(&self, video_id: &str, path: &Path, tags: &MediaTags) {
        let tagged = self.config.tagged_path(video_id);

        if let Err(e) = self.tagger.tag(path, &tagged, tags).await {
            tracing::warn!(
                video_id = %video_id,
                error = %e,
                "Failed to write metadata, keeping untagged audio"
            );
            remove_quietly(&tagged).await;
            return;
        }

        if let Err(e) = fs::rename(&tagged, path).await {
            tracing::warn!(
                video_id = %video_id,
                error = %e,
                "Failed to replace audio with tagged file, keeping untagged audio"
            );
            remove_quietly(&tagged).await;
            return;
        }

        tracing::debug!(video_id = %video_id, "Metadata written");
    }
}

/// 删除文件，不存在时忽略
pub(crate) async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove file");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::ports::{DownloadError, ResolveError, TagError};
    use crate::domain::{StreamFormat, VideoInfo};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    pub(crate) struct FakeResolver {
        pub info: Option<VideoInfo>,
        pub payload: Vec<u8>,
        pub fail_download: bool,
    }

    impl FakeResolver {
        pub(crate) fn new(info: VideoInfo) -> Self {
            Self {
                info: Some(info),
                payload: b"raw audio".to_vec(),
                fail_download: false,
            }
        }
    }

    #[async_trait]
    impl VideoResolverPort for FakeResolver {
        async fn resolve(&self, url: &str) -> Result<VideoInfo, ResolveError> {
            self.info
                .clone()
                .ok_or_else(|| ResolveError::ExtractorFailed(format!("unsupported: {}", url)))
        }

        async fn download(
            &self,
            _video: &VideoInfo,
            _format: &StreamFormat,
            dest: &Path,
        ) -> Result<u64, DownloadError> {
            if self.fail_download {
                fs::write(dest, b"partial").await.unwrap();
                return Err(DownloadError::ToolFailed("HTTP Error 403: Forbidden".to_string()));
            }
            fs::write(dest, &self.payload).await.unwrap();
            Ok(self.payload.len() as u64)
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeTagger {
        pub fail: bool,
        pub calls: Mutex<Vec<MediaTags>>,
    }

    #[async_trait]
    impl MediaTaggerPort for FakeTagger {
        async fn tag(&self, input: &Path, output: &Path, tags: &MediaTags) -> Result<(), TagError> {
            self.calls.lock().unwrap().push(tags.clone());
            if self.fail {
                fs::write(output, b"half").await.unwrap();
                return Err(TagError::ToolFailed {
                    code: Some(1),
                    stderr: "invalid data".to_string(),
                });
            }
            let mut data = b"tagged:".to_vec();
            data.extend(fs::read(input).await.unwrap());
            fs::write(output, data).await.unwrap();
            Ok(())
        }
    }

    pub(crate) fn sample_video() -> VideoInfo {
        VideoInfo {
            id: "video123".to_string(),
            webpage_url: "https://example/video123".to_string(),
            title: "Morning Show/Season 2/Episode 14".to_string(),
            uploader: "Radio Channel".to_string(),
            duration_secs: 1830.6,
            description: "Today's topics".to_string(),
            formats: vec![
                StreamFormat {
                    format_id: "18".to_string(),
                    audio_encoding: "aac".to_string(),
                    video_encoding: "h264".to_string(),
                    resolution: "640x360".to_string(),
                    audio_bitrate: 96,
                    ..Default::default()
                },
                StreamFormat {
                    format_id: "140".to_string(),
                    audio_encoding: "aac".to_string(),
                    audio_bitrate: 128,
                    ..Default::default()
                },
            ],
        }
    }

    fn pipeline(dir: &Path, resolver: FakeResolver, tagger: Arc<FakeTagger>) -> AcquisitionPipeline {
        AcquisitionPipeline::new(PipelineConfig::new(dir), Arc::new(resolver), tagger)
    }

    #[tokio::test]
    async fn test_acquire_builds_tagged_artifact() {
        let dir = tempdir().unwrap();
        let tagger = Arc::new(FakeTagger::default());
        let pipeline = pipeline(dir.path(), FakeResolver::new(sample_video()), tagger.clone());

        let acquisition = pipeline
            .acquire("https://example/video123", ChatId(555))
            .await
            .unwrap();
        let artifact = acquisition.artifact;

        assert_eq!(artifact.path, dir.path().join("video123.m4a"));
        assert_eq!(artifact.title, "Morning Show");
        assert_eq!(artifact.artist, "Radio Channel");
        assert_eq!(artifact.duration, 1830);
        assert_eq!(artifact.caption, "Morning Show/Season 2/Episode 14\n\nToday's topics");
        assert_eq!(artifact.chat_id, ChatId(555));

        assert_eq!(fs::read(&artifact.path).await.unwrap(), b"tagged:raw audio");
        assert!(!dir.path().join("video123-new.m4a").exists());

        let calls = tagger.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            MediaTags {
                title: "Morning Show".to_string(),
                artist: "Radio Channel".to_string(),
                album: "Season 2".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_tagging_failure_keeps_untagged_file() {
        let dir = tempdir().unwrap();
        let tagger = Arc::new(FakeTagger {
            fail: true,
            ..Default::default()
        });
        let pipeline = pipeline(dir.path(), FakeResolver::new(sample_video()), tagger);

        let artifact = pipeline
            .acquire("https://example/video123", ChatId(555))
            .await
            .unwrap()
            .artifact;

        assert_eq!(fs::read(&artifact.path).await.unwrap(), b"raw audio");
        assert!(!dir.path().join("video123-new.m4a").exists());
    }

    #[tokio::test]
    async fn test_resolve_failure() {
        let dir = tempdir().unwrap();
        let resolver = FakeResolver {
            info: None,
            payload: Vec::new(),
            fail_download: false,
        };
        let pipeline = pipeline(dir.path(), resolver, Arc::new(FakeTagger::default()));

        let err = pipeline.acquire("not a url", ChatId(1)).await.unwrap_err();
        assert_eq!(err.kind(), "resolve");
    }

    #[tokio::test]
    async fn test_no_audio_format_creates_nothing() {
        let dir = tempdir().unwrap();
        let mut video = sample_video();
        video.formats.retain(|f| !f.video_encoding.is_empty());
        let pipeline = pipeline(dir.path(), FakeResolver::new(video), Arc::new(FakeTagger::default()));

        let err = pipeline.acquire("https://example/video123", ChatId(1)).await.unwrap_err();
        assert_eq!(err.kind(), "no_audio_format");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_download_failure_removes_partial_file() {
        let dir = tempdir().unwrap();
        let mut resolver = FakeResolver::new(sample_video());
        resolver.fail_download = true;
        let tagger = Arc::new(FakeTagger::default());
        let pipeline = pipeline(dir.path(), resolver, tagger.clone());

        let err = pipeline.acquire("https://example/video123", ChatId(1)).await.unwrap_err();
        assert_eq!(err.kind(), "download");
        assert!(!dir.path().join("video123.m4a").exists());
        assert!(tagger.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rerun_after_scratch_reset_is_identical() {
        let dir = tempdir().unwrap();
        let scratch = dir.path().join("tmp");
        fs::create_dir_all(&scratch).await.unwrap();
        let pipeline = pipeline(&scratch, FakeResolver::new(sample_video()), Arc::new(FakeTagger::default()));

        let first = pipeline.acquire("https://example/video123", ChatId(555)).await.unwrap();
        let first_bytes = fs::read(&first.artifact.path).await.unwrap();
        drop(first.lease);

        fs::remove_dir_all(&scratch).await.unwrap();
        fs::create_dir_all(&scratch).await.unwrap();

        let second = pipeline.acquire("https://example/video123", ChatId(555)).await.unwrap();
        assert_eq!(first.artifact, second.artifact);
        assert_eq!(fs::read(&second.artifact.path).await.unwrap(), first_bytes);
    }

    #[test]
    fn test_scratch_paths() {
        let config = PipelineConfig::new("tmp");
        assert_eq!(config.audio_path("abc_-1"), PathBuf::from("tmp/abc_-1.m4a"));
        assert_eq!(config.tagged_path("abc"), PathBuf::from("tmp/abc-new.m4a"));
        assert_eq!(config.audio_path("../x"), PathBuf::from("tmp/___x.m4a"));

        let opus = PipelineConfig::new("tmp").with_audio_codec("opus");
        assert_eq!(opus.audio_path("abc"), PathBuf::from("tmp/abc.webm"));
    }
}
