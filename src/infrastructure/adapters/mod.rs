//! Infrastructure Adapters
//!
//! 端口的具体实现

pub mod storage;
pub mod tagger;
pub mod telegram;
pub mod ytdlp;

pub use storage::*;
pub use tagger::*;
pub use telegram::*;
pub use ytdlp::*;
