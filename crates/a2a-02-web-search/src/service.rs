//! # Web Search Service
//!
//! Runs the primary query and, for comprehensive requests, up to
//! [`MAX_FOLLOW_UPS`] follow-up queries. Results are ranked per query and
//! de-duplicated by URL in arrival order.

use crate::domain::{
    dedup_by_url, follow_up_limit, follow_up_queries, placeholder_result, MAX_FOLLOW_UPS,
};
use crate::ports::SearchBackend;
use chrono::Utc;
use shared_types::{SearchRequest, SearchResponse, SearchResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct WebSearchService {
    backend: Arc<dyn SearchBackend>,
}

impl WebSearchService {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// One backend query, ranked. A backend failure yields a single
    /// placeholder result.
    pub async fn search_once(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let now = Utc::now();
        match self.backend.search(query, max_results).await {
            Ok(hits) => hits
                .into_iter()
                .take(max_results)
                .enumerate()
                .map(|(rank, hit)| hit.into_result(query, rank, now))
                .collect(),
            Err(e) => {
                warn!(query = %query, error = %e, "[web-search] Backend failed, returning placeholder");
                vec![placeholder_result(query, now)]
            }
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> SearchResponse {
        let mut all = self
            .search_once(&request.query_text, request.max_results)
            .await;

        if request.comprehensive {
            let follow_ups = request
                .follow_up_queries
                .clone()
                .unwrap_or_else(|| follow_up_queries(&request.query_text));
            let per_query = follow_up_limit(request.max_results);
            for follow_up in follow_ups.iter().take(MAX_FOLLOW_UPS) {
                debug!(query = %follow_up, "[web-search] Follow-up search");
                all.extend(self.search_once(follow_up, per_query).await);
            }
        }

        let searched = all.len();
        let results = dedup_by_url(all);
        info!(
            query = %request.query_text,
            unique = results.len(),
            total = searched,
            "[web-search] Search complete"
        );

        SearchResponse {
            total_results: results.len(),
            query: request.query_text.clone(),
            results,
        }
    }
}
