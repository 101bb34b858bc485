#[cfg(test)]
mod tests {
    use crate::ForwardCycle;
    use async_trait::async_trait;
    use redgram_core::{
        DispatchOutcome, ForwarderError, ListingSource, MediaKind, MessageSink, Post,
        RedditApiError,
    };
    use state_store::DedupStore;
    use std::sync::Mutex;

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            title: format!("Post {}", id),
            permalink: format!("https://www.reddit.com/r/test/comments/{}/", id),
            media_kind: MediaKind::PlainLink,
            media_url: Some("https://example.com/article".to_string()),
        }
    }

    /// Listing stub returning a fixed page, newest-first.
    struct FixedListing {
        posts: Vec<Post>,
    }

    #[async_trait]
    impl ListingSource for FixedListing {
        async fn fetch_posts(&self) -> Result<Vec<Post>, ForwarderError> {
            Ok(self.posts.clone())
        }
    }

    struct FailingListing;

    #[async_trait]
    impl ListingSource for FailingListing {
        async fn fetch_posts(&self) -> Result<Vec<Post>, ForwarderError> {
            Err(RedditApiError::ServerError { status_code: 503 }.into())
        }
    }

    /// Sink that records dispatch order and fails for configured ids.
    struct RecordingSink {
        dispatched: Mutex<Vec<String>>,
        fail_ids: Vec<String>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                dispatched: Mutex::new(Vec::new()),
                fail_ids: Vec::new(),
            }
        }

        fn failing_on(ids: &[&str]) -> Self {
            Self {
                dispatched: Mutex::new(Vec::new()),
                fail_ids: ids.iter().map(|id| id.to_string()).collect(),
            }
        }

        fn dispatched(&self) -> Vec<String> {
            self.dispatched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<'a> MessageSink for &'a RecordingSink {
        async fn dispatch(&self, post: &Post) -> DispatchOutcome {
            self.dispatched.lock().unwrap().push(post.id.clone());
            if self.fail_ids.contains(&post.id) {
                DispatchOutcome::Failure {
                    reason: "send failed".to_string(),
                }
            } else {
                DispatchOutcome::Success
            }
        }
    }

    fn new_store(dir: &tempfile::TempDir) -> DedupStore {
        DedupStore::load(dir.path().join("state.json")).unwrap()
    }

    #[tokio::test]
    async fn test_first_run_forwards_entire_listing_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = new_store(&dir);

        let listing = FixedListing {
            posts: vec![post("t3_newest"), post("t3_middle"), post("t3_oldest")],
        };
        let sink = RecordingSink::new();
        let cycle = ForwardCycle::new(listing, &sink);

        let report = cycle.run(&mut store).await.unwrap();
        assert_eq!(report.fetched, 3);
        assert_eq!(report.forwarded, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(
            sink.dispatched(),
            vec!["t3_oldest", "t3_middle", "t3_newest"]
        );
        assert!(store.contains("t3_newest"));
        assert!(store.contains("t3_oldest"));
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let listing = FixedListing {
            posts: vec![post("t3_a"), post("t3_b")],
        };
        let sink = RecordingSink::new();
        let cycle = ForwardCycle::new(listing, &sink);

        let mut store = DedupStore::load(&path).unwrap();
        let first = cycle.run(&mut store).await.unwrap();
        assert_eq!(first.forwarded, 2);

        // Fresh process: reload the store from disk, same listing
        let mut store = DedupStore::load(&path).unwrap();
        let second = cycle.run(&mut store).await.unwrap();
        assert_eq!(second.forwarded, 0);
        assert_eq!(second.already_seen, 2);

        // Each post dispatched at most once across both runs
        assert_eq!(sink.dispatched().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_containment() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = new_store(&dir);

        // Oldest-first dispatch order: t3_3, t3_2, t3_1; t3_2 fails
        let listing = FixedListing {
            posts: vec![post("t3_1"), post("t3_2"), post("t3_3")],
        };
        let sink = RecordingSink::failing_on(&["t3_2"]);
        let cycle = ForwardCycle::new(listing, &sink);

        let report = cycle.run(&mut store).await.unwrap();
        assert_eq!(report.forwarded, 2);
        assert_eq!(report.failed, 1);

        // The failure did not block later posts
        assert_eq!(sink.dispatched(), vec!["t3_3", "t3_2", "t3_1"]);

        // Failed post is not marked and is retried next cycle
        assert!(store.contains("t3_1"));
        assert!(!store.contains("t3_2"));
        assert!(store.contains("t3_3"));
    }

    #[tokio::test]
    async fn test_failed_post_retried_next_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let listing = FixedListing {
            posts: vec![post("t3_a"), post("t3_b")],
        };

        let failing = RecordingSink::failing_on(&["t3_b"]);
        let cycle = ForwardCycle::new(
            FixedListing {
                posts: listing.posts.clone(),
            },
            &failing,
        );
        let mut store = DedupStore::load(&path).unwrap();
        cycle.run(&mut store).await.unwrap();

        let healthy = RecordingSink::new();
        let cycle = ForwardCycle::new(listing, &healthy);
        let mut store = DedupStore::load(&path).unwrap();
        let report = cycle.run(&mut store).await.unwrap();

        assert_eq!(report.already_seen, 1);
        assert_eq!(report.forwarded, 1);
        assert_eq!(healthy.dispatched(), vec!["t3_b"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_with_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let sink = RecordingSink::new();
        let cycle = ForwardCycle::new(FailingListing, &sink);

        let mut store = DedupStore::load(&path).unwrap();
        let result = cycle.run(&mut store).await;
        assert!(result.is_err());
        assert!(sink.dispatched().is_empty());

        // Nothing was persisted
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_empty_listing_reports_zeroes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = new_store(&dir);

        let sink = RecordingSink::new();
        let cycle = ForwardCycle::new(FixedListing { posts: vec![] }, &sink);

        let report = cycle.run(&mut store).await.unwrap();
        assert_eq!(report.fetched, 0);
        assert_eq!(report.forwarded, 0);
    }

    #[tokio::test]
    async fn test_state_survives_across_processes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let sink = RecordingSink::new();
        let cycle = ForwardCycle::new(
            FixedListing {
                posts: vec![post("t3_old")],
            },
            &sink,
        );
        let mut store = DedupStore::load(&path).unwrap();
        cycle.run(&mut store).await.unwrap();

        // Next run sees one new post on top of the old one
        let sink = RecordingSink::new();
        let cycle = ForwardCycle::new(
            FixedListing {
                posts: vec![post("t3_new"), post("t3_old")],
            },
            &sink,
        );
        let mut store = DedupStore::load(&path).unwrap();
        let report = cycle.run(&mut store).await.unwrap();

        assert_eq!(report.forwarded, 1);
        assert_eq!(sink.dispatched(), vec!["t3_new"]);
    }
}
