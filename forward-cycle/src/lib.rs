use redgram_core::{DispatchOutcome, ForwarderError, ListingSource, MessageSink};
use state_store::DedupStore;
use tracing::{info, warn};

mod tests;

/// What one cycle did, for the invoking scheduler's logs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub fetched: usize,
    pub already_seen: usize,
    pub forwarded: usize,
    pub failed: usize,
}

/// One fetch-classify-dispatch-record pass.
///
/// The dedup store is loaded by the caller and passed in; this type owns the
/// ordering and failure semantics: a fetch failure aborts with the store
/// untouched, a single post's dispatch failure never blocks the rest of the
/// batch, and a persistence failure is fatal even though earlier posts were
/// already sent.
pub struct ForwardCycle<S, D> {
    source: S,
    sink: D,
}

impl<S: ListingSource, D: MessageSink> ForwardCycle<S, D> {
    pub fn new(source: S, sink: D) -> Self {
        Self { source, sink }
    }

    pub async fn run(&self, store: &mut DedupStore) -> Result<CycleReport, ForwarderError> {
        info!("Fetching listing");
        let posts = self.source.fetch_posts().await?;
        let fetched = posts.len();

        info!("Filtering {} posts against {} known ids", fetched, store.len());
        let unseen: Vec<_> = posts
            .into_iter()
            .filter(|post| !store.contains(&post.id))
            .collect();
        let already_seen = fetched - unseen.len();

        let mut report = CycleReport {
            fetched,
            already_seen,
            ..Default::default()
        };

        // The listing arrives newest-first; dispatch oldest-first so an
        // interrupted run leaves the earliest posts sent and the newest to
        // be retried next cycle.
        for post in unseen.iter().rev() {
            match self.sink.dispatch(post).await {
                DispatchOutcome::Success => {
                    store.mark(&post.id);
                    // Persist after each success to bound re-send risk if
                    // the process dies mid-batch.
                    store.persist()?;
                    report.forwarded += 1;
                }
                DispatchOutcome::Failure { reason } => {
                    warn!("Failed to forward {}: {}", post.id, reason);
                    report.failed += 1;
                }
            }
        }

        store.persist()?;
        info!(
            "Cycle done: {} fetched, {} already seen, {} forwarded, {} failed",
            report.fetched, report.already_seen, report.forwarded, report.failed
        );
        Ok(report)
    }
}
