use crate::api::TelegramApiClient;
use async_trait::async_trait;
use redgram_core::{
    Config, DispatchOutcome, ForwarderError, MediaKind, MessageSink, Post, RetryConfig,
    RetryExecutor,
};
use tracing::{info, warn};

const CAPTION_SUFFIX: &str = " ... Read on Reddit → ";

/// Hard character cut at `char_limit`; titles at or under the limit pass
/// through unchanged. Deterministic for a given input.
pub fn truncate_title(title: &str, char_limit: usize) -> String {
    if title.chars().count() <= char_limit {
        title.to_string()
    } else {
        title.chars().take(char_limit).collect()
    }
}

pub fn build_caption(post: &Post, char_limit: usize) -> String {
    format!(
        "{}{}{}",
        truncate_title(&post.title, char_limit),
        CAPTION_SUFFIX,
        post.permalink
    )
}

/// The two Bot API call shapes the dispatcher uses. `TelegramApiClient` is
/// the production implementation; tests substitute their own.
#[async_trait]
pub trait BotApi {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), ForwarderError>;
    async fn send_video(
        &self,
        chat_id: &str,
        video_url: &str,
        caption: &str,
    ) -> Result<(), ForwarderError>;
}

#[async_trait]
impl BotApi for TelegramApiClient {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), ForwarderError> {
        TelegramApiClient::send_message(self, chat_id, text).await
    }

    async fn send_video(
        &self,
        chat_id: &str,
        video_url: &str,
        caption: &str,
    ) -> Result<(), ForwarderError> {
        TelegramApiClient::send_video(self, chat_id, video_url, caption).await
    }
}

/// Message dispatcher: renders a post and routes it to the send operation
/// its media kind calls for. Errors never escape this boundary; callers get
/// a `DispatchOutcome` and decide whether to mark the post forwarded.
pub struct TelegramDispatcher<A = TelegramApiClient> {
    api: A,
    retry: RetryExecutor,
    chat_id: String,
    char_limit: usize,
}

impl TelegramDispatcher<TelegramApiClient> {
    pub fn new(config: &Config) -> Result<Self, ForwarderError> {
        Ok(Self::with_api(
            TelegramApiClient::new(config.bot_token.clone())?,
            config.chat_id.clone(),
            config.char_limit,
        ))
    }
}

impl<A: BotApi + Send + Sync> TelegramDispatcher<A> {
    pub fn with_api(api: A, chat_id: String, char_limit: usize) -> Self {
        Self {
            api,
            retry: RetryExecutor::new(RetryConfig::telegram()),
            chat_id,
            char_limit,
        }
    }

    /// Message body for the text-send path. Link kinds carry the outbound
    /// URL below the caption so Telegram renders its preview/player.
    fn render_text(&self, post: &Post) -> String {
        let caption = build_caption(post, self.char_limit);
        match post.media_kind {
            MediaKind::ExternalLink | MediaKind::PlainLink => match &post.media_url {
                Some(url) => format!("{}\n\n{}", caption, url),
                None => caption,
            },
            _ => caption,
        }
    }

    async fn send_text(&self, post: &Post) -> Result<(), ForwarderError> {
        let text = self.render_text(post);
        self.retry
            .execute("send_message", || self.api.send_message(&self.chat_id, &text))
            .await
    }

    async fn send_video(&self, post: &Post, video_url: &str) -> Result<(), ForwarderError> {
        let caption = build_caption(post, self.char_limit);
        self.retry
            .execute("send_video", || {
                self.api.send_video(&self.chat_id, video_url, &caption)
            })
            .await
    }
}

#[async_trait]
impl<A: BotApi + Send + Sync> MessageSink for TelegramDispatcher<A> {
    async fn dispatch(&self, post: &Post) -> DispatchOutcome {
        let result = match (&post.media_kind, &post.media_url) {
            (MediaKind::NativeVideo, Some(video_url)) => {
                match self.send_video(post, video_url).await {
                    Ok(()) => Ok(()),
                    Err(err) => {
                        // Fall back to text so the post is not silently dropped
                        warn!(
                            "Video send failed for {} ({}), falling back to text",
                            post.id, err
                        );
                        self.send_text(post).await
                    }
                }
            }
            _ => self.send_text(post).await,
        };

        match result {
            Ok(()) => {
                info!("Forwarded {} as {:?}", post.id, post.media_kind);
                DispatchOutcome::Success
            }
            Err(err) => DispatchOutcome::Failure {
                reason: err.to_string(),
            },
        }
    }
}
