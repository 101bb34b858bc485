use redgram_core::{ForwarderError, RedditApiError};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

const TOKEN_ENDPOINT: &str = "https://www.reddit.com/api/v1/access_token";

/// Refresh the token this long before its actual expiry so an in-flight
/// request never crosses the boundary.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl RedditToken {
    pub fn needs_refresh(&self) -> bool {
        match self.expires_at.duration_since(SystemTime::now()) {
            Ok(remaining) => remaining <= EXPIRY_SKEW,
            Err(_) => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    expires_in: u64,
}

/// App-only OAuth credential provider (`client_credentials` grant).
///
/// Callers ask for a bearer token and get a cached one back until it nears
/// expiry; the refresh round-trip is owned entirely by this type.
#[derive(Debug)]
pub struct CredentialProvider {
    http_client: Client,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<RedditToken>>,
}

impl CredentialProvider {
    pub fn new(
        client_id: String,
        client_secret: String,
        user_agent: &str,
    ) -> Result<Self, ForwarderError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            client_id,
            client_secret,
            cached: Mutex::new(None),
        })
    }

    /// Return a usable bearer token, refreshing transparently when the
    /// cached one is missing or stale.
    pub async fn bearer_token(&self) -> Result<String, ForwarderError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.needs_refresh() {
                return Ok(token.access_token.clone());
            }
            debug!("Cached Reddit token near expiry, refreshing");
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<RedditToken, ForwarderError> {
        let response = self
            .http_client
            .post(TOKEN_ENDPOINT)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Token request failed with status {}", status);
            return Err(RedditApiError::AuthenticationFailed {
                reason: format!("token endpoint returned {}", status),
            }
            .into());
        }

        let token_response: AccessTokenResponse = response.json().await.map_err(|e| {
            ForwarderError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: format!("invalid token response: {}", e),
            })
        })?;

        info!(
            "Obtained Reddit app token, expires in {}s",
            token_response.expires_in
        );
        Ok(RedditToken {
            access_token: token_response.access_token,
            expires_at: SystemTime::now() + Duration::from_secs(token_response.expires_in),
        })
    }
}
