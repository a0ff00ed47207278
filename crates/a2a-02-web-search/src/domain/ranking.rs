//! Pure search rules.

use chrono::{DateTime, Utc};
use shared_types::{url_host, SearchResult};
use std::collections::HashSet;
use uuid::Uuid;

/// Follow-up searches per comprehensive request.
pub const MAX_FOLLOW_UPS: usize = 3;

/// Minimum results requested per follow-up search.
const MIN_FOLLOW_UP_RESULTS: usize = 5;

/// A raw hit from a backend, before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }

    /// Ranks the hit at position `rank` (0-based) of the answer to `query`.
    pub fn into_result(self, query: &str, rank: usize, at: DateTime<Utc>) -> SearchResult {
        let source = url_host(&self.url).to_string();
        SearchResult {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            url: self.url,
            snippet: self.snippet,
            source,
            search_query: query.to_string(),
            relevance_score: relevance_for_rank(rank),
            extracted_at: Some(at),
        }
    }
}

/// `max(0.9 - 0.1 * rank, 0.1)`.
pub fn relevance_for_rank(rank: usize) -> f64 {
    let decayed = (9usize.saturating_sub(rank)) as f64 / 10.0;
    decayed.max(0.1)
}

/// Default follow-up queries for `query`.
pub fn follow_up_queries(query: &str) -> Vec<String> {
    ["background", "analysis", "details"]
        .iter()
        .map(|suffix| format!("{query} {suffix}"))
        .collect()
}

/// Results requested for each follow-up search.
pub fn follow_up_limit(max_results: usize) -> usize {
    (max_results / 2).max(MIN_FOLLOW_UP_RESULTS)
}

/// Keeps the first result for every URL, preserving order.
pub fn dedup_by_url(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}

/// Stand-in answer when the backend fails.
pub fn placeholder_result(query: &str, at: DateTime<Utc>) -> SearchResult {
    SearchResult {
        id: Uuid::new_v4().to_string(),
        title: format!("Search results for: {query}"),
        url: format!("https://duckduckgo.com/?q={}", query.replace(' ', "+")),
        snippet: format!("Search temporarily unavailable. Query: {query}"),
        source: "DuckDuckGo".to_string(),
        search_query: query.to_string(),
        relevance_score: 0.5,
        extracted_at: Some(at),
    }
}
