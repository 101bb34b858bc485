use redgram_core::{ForwarderError, TelegramApiError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, warn};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram wraps every response in this envelope; errors carry a
/// description and, for 429, a retry-after hint under `parameters`.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[derive(Debug)]
pub struct TelegramApiClient {
    http_client: Client,
    bot_token: String,
}

impl TelegramApiClient {
    pub fn new(bot_token: String) -> Result<Self, ForwarderError> {
        // sendVideo by URL can take a while on Telegram's side
        let http_client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            http_client,
            bot_token,
        })
    }

    async fn call(&self, method: &str, payload: serde_json::Value) -> Result<(), ForwarderError> {
        let url = format!("{}/bot{}/{}", TELEGRAM_API_BASE, self.bot_token, method);

        debug!("Making Telegram API request: {}", method);
        let response = match self.http_client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {}: {}", method, e);
                if e.is_timeout() {
                    return Err(TelegramApiError::RequestTimeout.into());
                }
                return Err(ForwarderError::Network(e));
            }
        };

        let status = response.status();
        let body: ApiResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                // A non-JSON body from a 5xx is still a server error
                if status.is_server_error() {
                    return Err(TelegramApiError::ServerError {
                        status_code: status.as_u16(),
                    }
                    .into());
                }
                return Err(TelegramApiError::InvalidResponse {
                    details: format!("{} returned undecodable body: {}", method, e),
                }
                .into());
            }
        };

        if body.ok {
            debug!("Telegram request successful: {}", method);
            return Ok(());
        }

        let description = body
            .description
            .unwrap_or_else(|| format!("{} failed with status {}", method, status));
        error!("Telegram request failed: {} ({})", description, status);

        match status.as_u16() {
            429 => {
                let retry_after = body
                    .parameters
                    .and_then(|p| p.retry_after)
                    .unwrap_or(30);
                warn!("Telegram rate limited, retry after {} seconds", retry_after);
                Err(TelegramApiError::RateLimitExceeded { retry_after }.into())
            }
            401 => Err(TelegramApiError::Unauthorized.into()),
            400 => Err(TelegramApiError::BadRequest { description }.into()),
            code if status.is_server_error() => {
                Err(TelegramApiError::ServerError { status_code: code }.into())
            }
            _ => Err(TelegramApiError::InvalidResponse { details: description }.into()),
        }
    }

    /// `sendMessage`: plain text, link previews left enabled so Telegram
    /// auto-embeds whatever the text links to.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), ForwarderError> {
        self.call(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "disable_web_page_preview": false,
            }),
        )
        .await
    }

    /// `sendVideo` by URL with inline streaming playback enabled.
    pub async fn send_video(
        &self,
        chat_id: &str,
        video_url: &str,
        caption: &str,
    ) -> Result<(), ForwarderError> {
        self.call(
            "sendVideo",
            json!({
                "chat_id": chat_id,
                "video": video_url,
                "caption": caption,
                "supports_streaming": true,
            }),
        )
        .await
    }
}
