use crate::domain::{SearchError, SearchHit};
use async_trait::async_trait;

/// Source of raw search hits, best match first.
///
/// Returning fewer than `max_results` hits is fine. Ranking and
/// de-duplication happen in the service, not here.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}
