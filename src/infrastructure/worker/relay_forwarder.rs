//! Relay Forwarder - 中转频道转发
//!
//! 长轮询 getUpdates，中转频道里带 RelayCaption 的音频按 file_id 转发到目标

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ChatId;
use crate::infrastructure::adapters::{BotApi, Message, RelayCaption};

/// 转发器配置
#[derive(Debug, Clone)]
pub struct RelayForwarderConfig {
    /// 中转频道 chat id，其他来源的消息忽略
    pub helper_chat_id: ChatId,
    /// getUpdates 长轮询等待时间（秒）
    pub poll_timeout_secs: u64,
    /// 轮询失败后的暂停时间
    pub error_pause: Duration,
}

impl RelayForwarderConfig {
    pub fn new(helper_chat_id: ChatId) -> Self {
        Self {
            helper_chat_id,
            poll_timeout_secs: 60,
            error_pause: Duration::from_secs(5),
        }
    }
}

/// 转发目标
#[derive(Debug, Clone, PartialEq)]
struct Forward {
    chat_id: ChatId,
    file_id: String,
    caption: String,
}

pub struct RelayForwarder {
    bot: Arc<dyn BotApi>,
    config: RelayForwarderConfig,
    offset: i64,
}

impl RelayForwarder {
    pub fn new(bot: Arc<dyn BotApi>, config: RelayForwarderConfig) -> Self {
        Self {
            bot,
            config,
            offset: 0,
        }
    }

    /// 启动转发循环（不退出，随进程结束）
    pub async fn run(mut self) {
        tracing::info!(helper_chat_id = %self.config.helper_chat_id, "RelayForwarder started");

        loop {
            if let Err(pause) = self.poll_once().await {
                tokio::time::sleep(pause).await;
            }
        }
    }

    /// 拉一批更新并处理，失败时返回需要暂停的时长
    async fn poll_once(&mut self) -> Result<usize, Duration> {
        let updates = match self
            .bot
            .get_updates(self.offset, self.config.poll_timeout_secs)
            .await
        {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed");
                return Err(self.config.error_pause);
            }
        };

        let mut forwarded = 0;
        for update in &updates {
            self.offset = self.offset.max(update.update_id + 1);

            let Some(forward) = update.message().and_then(|m| self.extract(m)) else {
                continue;
            };

            match self
                .bot
                .send_audio_by_id(forward.chat_id, &forward.file_id, &forward.caption)
                .await
            {
                Ok(_) => {
                    forwarded += 1;
                    tracing::info!(chat_id = %forward.chat_id, "Relayed audio forwarded");
                }
                Err(e) => {
                    tracing::error!(chat_id = %forward.chat_id, error = %e, "Failed to forward relayed audio");
                }
            }
        }

        Ok(forwarded)
    }

    fn extract(&self, message: &Message) -> Option<Forward> {
        if message.chat.id != self.config.helper_chat_id.as_i64() {
            return None;
        }
        let audio = message.audio.as_ref()?;
        let caption = message.caption.as_deref()?;

        match RelayCaption::parse(caption) {
            Ok(relay) => Some(Forward {
                chat_id: relay.channel_id,
                file_id: audio.file_id.clone(),
                caption: relay.desc,
            }),
            Err(e) => {
                tracing::debug!(message_id = message.message_id, error = %e, "Skipping non-relay caption");
                None
            }
        }
    }
}
