pub mod api;
pub mod dispatch;

pub use api::TelegramApiClient;
pub use dispatch::{build_caption, truncate_title, BotApi, TelegramDispatcher};
