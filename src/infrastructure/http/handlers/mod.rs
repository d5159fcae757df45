//! HTTP Handlers

mod ping;
mod trigger;

pub use ping::*;
pub use trigger::*;
