//! FFmpeg Tagger - 用 ffmpeg 改写容器标签
//!
//! `-codec copy` 原样复制音频流，不重新编码

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::application::ports::{MediaTaggerPort, MediaTags, TagError};

/// ffmpeg 标签写入器
pub struct FfmpegTagger {
    program: String,
}

impl FfmpegTagger {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 构建命令参数
    fn build_args(input: &Path, output: &Path, tags: &MediaTags) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];
        for (key, value) in [
            ("title", &tags.title),
            ("artist", &tags.artist),
            ("album", &tags.album),
        ] {
            args.push("-metadata".into());
            args.push(format!("{}={}", key, value).into());
        }
        args.push("-codec".into());
        args.push("copy".into());
        args.push(output.into());
        args
    }
}

impl Default for FfmpegTagger {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl MediaTaggerPort for FfmpegTagger {
    async fn tag(&self, input: &Path, output: &Path, tags: &MediaTags) -> Result<(), TagError> {
        let args = Self::build_args(input, output, tags);

        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| TagError::SpawnFailed(format!("{}: {}", self.program, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            // ffmpeg 的 stderr 很长，只保留最后几行
            let tail: Vec<&str> = stderr.lines().rev().take(3).collect();
            return Err(TagError::ToolFailed {
                code: result.status.code(),
                stderr: tail.into_iter().rev().collect::<Vec<_>>().join(" | "),
            });
        }

        tracing::debug!(output = %output.display(), "ffmpeg wrote metadata");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tags() -> MediaTags {
        MediaTags {
            title: "Morning Show".to_string(),
            artist: "Radio Channel".to_string(),
            album: "".to_string(),
        }
    }

    #[test]
    fn test_build_args() {
        let args = FfmpegTagger::build_args(
            &PathBuf::from("tmp/abc.m4a"),
            &PathBuf::from("tmp/abc-new.m4a"),
            &tags(),
        );
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "tmp/abc.m4a",
                "-metadata",
                "title=Morning Show",
                "-metadata",
                "artist=Radio Channel",
                "-metadata",
                "album=",
                "-codec",
                "copy",
                "tmp/abc-new.m4a",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let tagger = FfmpegTagger::new("definitely-not-ffmpeg-binary");
        let err = tagger
            .tag(Path::new("in.m4a"), Path::new("out.m4a"), &tags())
            .await
            .unwrap_err();
        assert!(matches!(err, TagError::SpawnFailed(_)));
    }
}
