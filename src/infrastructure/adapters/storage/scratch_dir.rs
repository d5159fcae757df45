//! Scratch Directory - 草稿目录
//!
//! 启动时创建一次，之后只按文件删除

use std::path::{Path, PathBuf};
use tokio::fs;

/// 草稿目录
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// 创建目录（已存在时直接复用），失败属于启动错误
    pub async fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        fs::create_dir_all(&path).await?;

        let meta = fs::metadata(&path).await?;
        if !meta.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} exists and is not a directory", path.display()),
            ));
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
