//! Search collaborator abstraction.
//!
//! The core never computes similarity itself. Each retrieval strategy
//! (embedding search, n-gram search, keyword lookup, literal value match)
//! is an injected [`SearchSource`] that returns already-scored hits. The
//! application constructs the sources it has and passes them in; there
//! are no process-wide model or client singletons.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::rank::{Hit, SourceHits, SourceTag};

/// A retrieval collaborator for one source kind.
///
/// Implementations must be `Send + Sync`; one instance serves many
/// concurrent queries.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Instance name, used in logs and `schx sources` output.
    fn name(&self) -> &str;

    /// Which ranking bucket this source's hits belong to.
    fn tag(&self) -> SourceTag;

    /// Return up to `limit` scored hits for `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Hit>>;
}

/// Query every source and group the hits by tag.
///
/// A failing source is logged and contributes nothing; the remaining
/// sources still count. Several sources may share a tag, in which case
/// their hits are concatenated in source order.
pub async fn collect_hits(
    sources: &[Box<dyn SearchSource>],
    query: &str,
    limit: usize,
) -> SourceHits {
    let mut hits = SourceHits::default();
    if query.trim().is_empty() {
        return hits;
    }

    for source in sources {
        match source.search(query, limit).await {
            Ok(mut found) => {
                found.truncate(limit);
                debug!(
                    source = source.name(),
                    tag = %source.tag(),
                    hits = found.len(),
                    "search source returned"
                );
                hits.get_mut(source.tag()).extend(found);
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "search source failed, ignoring");
            }
        }
    }
    hits
}
