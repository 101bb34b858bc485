use crate::api::RedditPostData;
use redgram_core::{MediaKind, Post};
use url::Url;

const REDDIT_BASE: &str = "https://www.reddit.com";

/// Hosts whose links Telegram auto-renders as an inline player.
const EMBEDDABLE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "streamable.com",
    "www.streamable.com",
    "vimeo.com",
    "www.vimeo.com",
    "twitch.tv",
    "www.twitch.tv",
    "clips.twitch.tv",
];

/// Normalize a raw post record into a `Post` with exactly one media kind.
///
/// Total over every input shape: decision order is first-match-wins, and
/// anything unrecognized falls through to `PlainLink`. No network access.
pub fn classify(raw: &RedditPostData) -> Post {
    let root = crosspost_root(raw);
    let outbound = outbound_url(raw);

    let (media_kind, media_url) = if let Some(fallback) = video_fallback(raw, root) {
        (MediaKind::NativeVideo, Some(fallback))
    } else if outbound.map(is_embeddable_host).unwrap_or(false) {
        (MediaKind::ExternalLink, outbound.map(str::to_string))
    } else if raw.is_gallery {
        (MediaKind::Gallery, None)
    } else if raw.is_self || outbound.is_none() {
        (MediaKind::SelfText, None)
    } else {
        (MediaKind::PlainLink, outbound.map(str::to_string))
    };

    Post {
        id: raw.name.clone(),
        title: clean_title(&raw.title),
        permalink: format!("{}{}", REDDIT_BASE, raw.permalink),
        media_kind,
        media_url,
    }
}

/// Crossposts carry their media on the original payload.
fn crosspost_root(raw: &RedditPostData) -> &RedditPostData {
    raw.crosspost_parent_list.first().unwrap_or(raw)
}

fn outbound_url(raw: &RedditPostData) -> Option<&str> {
    raw.url_overridden_by_dest
        .as_deref()
        .or(raw.url.as_deref())
        .filter(|u| !u.is_empty())
}

/// A direct-playable URL for a Reddit-hosted video, when the post is flagged
/// as one. A video flag without a fallback URL yields `None` so the post
/// falls through to a link kind instead of an unsendable video.
fn video_fallback(raw: &RedditPostData, root: &RedditPostData) -> Option<String> {
    let flagged = raw.is_video || raw.post_hint.as_deref() == Some("hosted:video");
    if !flagged {
        return None;
    }
    root.secure_media
        .as_ref()
        .or(root.media.as_ref())
        .and_then(|m| m.reddit_video.as_ref())
        .and_then(|v| v.fallback_url.clone())
}

fn is_embeddable_host(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .map(|host| EMBEDDABLE_HOSTS.contains(&host.as_str()))
        .unwrap_or(false)
}

fn clean_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
