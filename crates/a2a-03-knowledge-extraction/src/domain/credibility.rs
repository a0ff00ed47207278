//! Rule-based source credibility.

use shared_types::{url_host, CredibilityAnalysis, SearchResult};

/// Hosts considered highly credible when they appear anywhere in the URL.
pub const TRUSTED_SOURCES: [&str; 8] = [
    "nature.com",
    "science.org",
    "ieee.org",
    "acm.org",
    "nist.gov",
    "arxiv.org",
    "pubmed.ncbi.nlm.nih.gov",
    "scholar.google.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credibility {
    High,
    Medium,
    Low,
}

pub fn credibility_of(url: &str) -> Credibility {
    let host = url_host(url);
    if TRUSTED_SOURCES.iter().any(|trusted| url.contains(trusted)) {
        Credibility::High
    } else if host.ends_with(".edu") || host.ends_with(".gov") {
        Credibility::Medium
    } else {
        Credibility::Low
    }
}

pub fn analyze_credibility(results: &[SearchResult]) -> CredibilityAnalysis {
    let mut analysis = CredibilityAnalysis {
        total_sources: results.len(),
        ..Default::default()
    };
    for result in results {
        match credibility_of(&result.url) {
            Credibility::High => analysis.high_credibility += 1,
            Credibility::Medium => analysis.medium_credibility += 1,
            Credibility::Low => analysis.low_credibility += 1,
        }
        *analysis
            .source_breakdown
            .entry(url_host(&result.url).to_string())
            .or_default() += 1;
    }
    analysis
}
