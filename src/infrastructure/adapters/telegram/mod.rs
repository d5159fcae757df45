//! Telegram Adapter - Bot API 客户端与上传实现

mod bot_client;
mod types;
mod uploaders;

pub use bot_client::{BotApi, TelegramBotClient, TelegramBotClientConfig};
pub use types::{
    ApiResponse, Audio, AudioUpload, BotApiError, Chat, Message, RelayCaption, Update, User,
    CAPTION_LIMIT,
};
pub use uploaders::{BotAudioUploader, CommandAudioUploader, CommandUploaderConfig};
