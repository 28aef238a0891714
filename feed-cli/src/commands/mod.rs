//! CLI command implementations.

pub mod friends;
pub mod history;

use anyhow::Result;
use wallfeed_client::{Feed, LoadOutcome};
use wallfeed_core::FeedEntity;

/// Load pages until end-of-data or `max_pages`. Returns the pages loaded.
pub async fn drain<T, K>(feed: &Feed<T, K>, max_pages: Option<usize>) -> Result<usize>
where
    T: FeedEntity,
    K: Clone + std::fmt::Debug + Send + Sync + 'static,
{
    let mut pages = 0;
    while max_pages.map_or(true, |max| pages < max) {
        match feed.load_next().await? {
            LoadOutcome::Loaded { count, end_reached } => {
                pages += 1;
                tracing::debug!(page = pages, count, end_reached, "page loaded");
            }
            LoadOutcome::Exhausted => break,
            LoadOutcome::Busy => {
                tracing::warn!("another load is in flight, stopping");
                break;
            }
            LoadOutcome::Failed(e) => return Err(e.into()),
        }
    }
    Ok(pages)
}
