pub mod api;
pub mod auth;
pub mod classify;

use async_trait::async_trait;
use redgram_core::{Config, ForwarderError, ListingSource, Post, RetryConfig, RetryExecutor, SortMode};
use tracing::debug;

pub use api::{RedditApiClient, RedditListing, RedditPostData};
pub use auth::CredentialProvider;
pub use classify::classify;

/// Listing fetcher: resolves a bearer token, pulls one listing page with
/// bounded retry, and normalizes the raw records into classified posts.
pub struct RedditClient {
    api: RedditApiClient,
    credentials: CredentialProvider,
    retry: RetryExecutor,
    subreddit: String,
    sort: SortMode,
    fetch_limit: u32,
}

impl RedditClient {
    pub fn new(config: &Config) -> Result<Self, ForwarderError> {
        let api = RedditApiClient::new(config.user_agent.clone())?;
        let credentials = CredentialProvider::new(
            config.reddit_client_id.clone(),
            config.reddit_client_secret.clone(),
            &config.user_agent,
        )?;

        Ok(Self {
            api,
            credentials,
            retry: RetryExecutor::new(RetryConfig::reddit()),
            subreddit: config.subreddit.clone(),
            sort: config.sort,
            fetch_limit: config.fetch_limit,
        })
    }
}

#[async_trait]
impl ListingSource for RedditClient {
    async fn fetch_posts(&self) -> Result<Vec<Post>, ForwarderError> {
        let access_token = self.credentials.bearer_token().await?;

        let listing = self
            .retry
            .execute("fetch_listing", || {
                self.api.get_subreddit_posts(
                    &access_token,
                    &self.subreddit,
                    self.sort,
                    self.fetch_limit,
                )
            })
            .await?;

        let posts: Vec<Post> = listing
            .data
            .children
            .iter()
            .map(|child| classify(&child.data))
            .collect();

        debug!("Classified {} posts from r/{}", posts.len(), self.subreddit);
        Ok(posts)
    }
}
