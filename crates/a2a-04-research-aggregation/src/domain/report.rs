//! Report generation.
//!
//! ## Source categories
//!
//! First matching rule wins:
//!
//! | Category | Rule |
//! |---|---|
//! | academic | url or source mentions nature, science, ieee, arxiv, pubmed or scholar |
//! | government | url contains `.gov`, or source mentions nist |
//! | commercial | url contains `.com` or `.org` |
//! | news | source mentions news, times, post or journal |
//! | other | anything else |

use crate::domain::ResearchSession;
use chrono::{DateTime, Utc};
use shared_types::{url_host, ResearchReport, SearchResult, SourceCategories};
use std::collections::HashMap;

pub const MAX_TOP_DOMAINS: usize = 5;

pub const KEY_FINDINGS: [&str; 3] = ["Analysis completed", "Sources reviewed", "Insights extracted"];

const ACADEMIC_TERMS: [&str; 6] = ["nature", "science", "ieee", "arxiv", "pubmed", "scholar"];
const NEWS_TERMS: [&str; 4] = ["news", "times", "post", "journal"];

pub fn categorize(results: &[SearchResult]) -> SourceCategories {
    let mut categories = SourceCategories::default();
    for result in results {
        let url = result.url.to_lowercase();
        let source = result.source.to_lowercase();
        if ACADEMIC_TERMS
            .iter()
            .any(|t| url.contains(t) || source.contains(t))
        {
            categories.academic += 1;
        } else if url.contains(".gov") || source.contains("nist") {
            categories.government += 1;
        } else if url.contains(".com") || url.contains(".org") {
            categories.commercial += 1;
        } else if NEWS_TERMS.iter().any(|t| source.contains(t)) {
            categories.news += 1;
        } else {
            categories.other += 1;
        }
    }
    categories
}

pub fn coverage(total_sources: usize) -> &'static str {
    match total_sources {
        n if n >= 10 => "Comprehensive",
        n if n >= 5 => "Moderate",
        _ => "Limited",
    }
}

/// `"{minutes}m {seconds}s"`; negative spans read as zero.
pub fn format_duration(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total = (now - started_at).num_seconds().max(0);
    format!("{}m {}s", total / 60, total % 60)
}

pub fn average_relevance(results: &[SearchResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.relevance_score).sum::<f64>() / results.len() as f64
}

/// Distinct hosts, most results first, ties in first-seen order.
/// Returns the unique host count alongside the top [`MAX_TOP_DOMAINS`].
pub fn top_domains(results: &[SearchResult]) -> (usize, Vec<String>) {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for result in results.iter().filter(|r| !r.url.is_empty()) {
        let host = url_host(&result.url);
        let count = counts.entry(host).or_insert(0);
        if *count == 0 {
            order.push(host);
        }
        *count += 1;
    }

    let unique = order.len();
    // Stable sort keeps first-seen order among equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    (
        unique,
        order
            .into_iter()
            .take(MAX_TOP_DOMAINS)
            .map(str::to_string)
            .collect(),
    )
}

pub fn build_report(session: &ResearchSession, now: DateTime<Utc>) -> ResearchReport {
    let results = &session.search_results;
    let (unique_domains, top) = top_domains(results);
    ResearchReport {
        session_id: session.session_id.clone(),
        topic: session.topic.clone(),
        generated_at: now,
        total_sources: results.len(),
        unique_domains,
        top_domains: top,
        average_relevance: average_relevance(results),
        source_types: categorize(results),
        research_coverage: coverage(results.len()).to_string(),
        session_duration: format_duration(session.started_at, now),
        total_insights: session.insights.len(),
        executive_summary: format!(
            "Basic research report on {} analyzing {} sources.",
            session.topic,
            results.len()
        ),
        key_findings: KEY_FINDINGS.iter().map(|s| s.to_string()).collect(),
    }
}
