//! Scratch Locks - 按视频 ID 互斥
//!
//! 同一视频的并发请求共用同一个草稿文件名，持有租约期间其它请求等待

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// 视频 ID -> 互斥锁
#[derive(Clone, Default)]
pub struct ScratchLocks {
    locks: Arc<LockTable>,
}

impl ScratchLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取某个视频的租约，已被占用时等待
    pub async fn lock(&self, video_id: &str) -> ScratchLease {
        let mutex = self
            .locks
            .entry(video_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;

        ScratchLease {
            key: video_id.to_string(),
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// 当前登记的锁数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// 草稿文件租约，drop 时释放
pub struct ScratchLease {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl ScratchLease {
    pub fn video_id(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for ScratchLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchLease").field("video_id", &self.key).finish()
    }
}

impl Drop for ScratchLease {
    fn drop(&mut self) {
        self.guard.take();
        // 没有等待者时清理表项
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_id_is_serialized() {
        let locks = ScratchLocks::new();
        let first = locks.lock("abc").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let lease = locks.lock("abc").await;
                lease.video_id().to_string()
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(first);
        let id = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id, "abc");
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_ids_do_not_block() {
        let locks = ScratchLocks::new();
        let _a = locks.lock("a").await;

        let b = tokio::time::timeout(Duration::from_millis(200), locks.lock("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
