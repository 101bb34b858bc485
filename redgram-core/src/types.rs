use crate::error::ForwarderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Content-delivery strategy assigned by the classifier. Every raw post maps
/// to exactly one kind; unrecognized shapes fall through to `PlainLink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    NativeVideo,
    ExternalLink,
    Gallery,
    SelfText,
    PlainLink,
}

/// A normalized post, ready for dispatch. `id` is the Reddit fullname
/// (e.g. `t3_abc123`) and is the only field the dedup ledger keys on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub permalink: String,
    pub media_kind: MediaKind,
    /// Direct video fallback for `NativeVideo`, outbound link for
    /// `ExternalLink`/`PlainLink`, absent otherwise.
    pub media_url: Option<String>,
}

/// Result of dispatching one post. Dispatch never propagates errors past
/// this boundary; a post is only marked forwarded on `Success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success,
    Failure { reason: String },
}

/// Source of one listing page of classified posts, newest-first.
#[async_trait]
pub trait ListingSource {
    async fn fetch_posts(&self) -> Result<Vec<Post>, ForwarderError>;
}

/// Sink that relays one post to the destination chat.
#[async_trait]
pub trait MessageSink {
    async fn dispatch(&self, post: &Post) -> DispatchOutcome;
}
