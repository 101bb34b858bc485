use redgram_core::{ForwarderError, RedditApiError, SortMode};
use reqwest::{Client, Method, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

/// Raw post record as Reddit returns it. Only the fields the classifier and
/// dispatcher consume are modeled; everything else in the payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedditPostData {
    /// Fullname, e.g. `t3_abc123`. Stable across fetches; the dedup key.
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_overridden_by_dest: Option<String>,
    #[serde(default)]
    pub post_hint: Option<String>,
    #[serde(default)]
    pub is_gallery: bool,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub secure_media: Option<MediaEmbed>,
    #[serde(default)]
    pub media: Option<MediaEmbed>,
    /// Crossposts carry the original payload here; media fields are read
    /// from the first entry when present.
    #[serde(default)]
    pub crosspost_parent_list: Vec<RedditPostData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaEmbed {
    #[serde(default)]
    pub reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedditVideo {
    #[serde(default)]
    pub fallback_url: Option<String>,
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    user_agent: String,
}

impl RedditApiClient {
    pub fn new(user_agent: String) -> Result<Self, ForwarderError> {
        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            user_agent,
        })
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, ForwarderError> {
        let url = format!("{}{}", REDDIT_API_BASE, endpoint);

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.user_agent);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(RedditApiError::RequestTimeout.into());
                }
                return Err(ForwarderError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                Err(RedditApiError::RateLimitExceeded { retry_after }.into())
            }
            401 => Err(RedditApiError::InvalidToken.into()),
            403 => Err(RedditApiError::Forbidden {
                resource: endpoint.to_string(),
            }
            .into()),
            code if status.is_server_error() => {
                Err(RedditApiError::ServerError { status_code: code }.into())
            }
            _ => Err(RedditApiError::InvalidResponse {
                details: format!("Unexpected status {} for {}", status, endpoint),
            }
            .into()),
        }
    }

    /// Fetch one page of a subreddit listing, newest-first, at most `limit`
    /// posts. Read-only; the caller owns filtering and dispatch.
    pub async fn get_subreddit_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        sort: SortMode,
        limit: u32,
    ) -> Result<RedditListing<RedditPostData>, ForwarderError> {
        let endpoint = format!("/r/{}/{}", subreddit, sort.as_str());
        let limit_str = limit.to_string();
        let params = [("limit", limit_str.as_str()), ("raw_json", "1")];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params))
            .await?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            ForwarderError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }
}
