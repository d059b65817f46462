use crate::aggregate::Aggregation;
use crate::{Error, MetadataSource, TitleMetadata, omdb};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Looks up metadata for every title of `aggregation`, one lookup per title,
/// all in flight at once. Returns once every lookup has finished.
///
/// A failed or timed-out lookup leaves the title's metadata `Absent`.
pub async fn enrich(
    mut aggregation: Aggregation,
    source: Arc<dyn MetadataSource>,
    timeout: Duration,
) -> Aggregation {
    let mut lookups = JoinSet::new();
    for title in aggregation.titles() {
        let title = title.to_string();
        let source = Arc::clone(&source);
        lookups.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, source.lookup(&title)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(timeout)),
            };
            (title, outcome)
        });
    }

    let (mut found, mut not_found, mut unavailable) = (0usize, 0usize, 0usize);
    while let Some(joined) = lookups.join_next().await {
        let (title, outcome) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                warn!("metadata lookup task failed: {e}");
                unavailable += 1;
                continue;
            }
        };
        match outcome.and_then(omdb::interpret) {
            Ok(metadata) => {
                match &metadata {
                    TitleMetadata::Found(_) => found += 1,
                    TitleMetadata::NotFound(err) => {
                        debug!(%title, message = %err.message, "metadata source has no match");
                        not_found += 1;
                    }
                    TitleMetadata::Absent => {}
                }
                aggregation.attach(&title, metadata);
            }
            Err(e) => {
                warn!(%title, "metadata lookup failed: {e}");
                unavailable += 1;
            }
        }
    }

    info!(found, not_found, unavailable, "metadata enrichment finished");
    aggregation
}
