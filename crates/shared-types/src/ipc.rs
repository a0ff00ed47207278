//! # Inter-Service Payloads
//!
//! Request and response bodies exchanged between the research services,
//! both as HTTP JSON bodies and as envelope payloads.
//!
//! ## Rules
//!
//! - Payloads never carry the caller's identity; the `X-Service-Name`
//!   header (HTTP) or the envelope `sender` is authoritative.
//! - Optional fields default so older callers keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extracts the host part of a URL (`scheme://host/...`).
///
/// Returns the input unchanged when it has no `//` authority section.
pub fn url_host(url: &str) -> &str {
    let mut parts = url.splitn(4, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(host)) => host,
        _ => url,
    }
}

// =============================================================================
// WEB SEARCH
// =============================================================================

fn default_max_results() -> usize {
    10
}

/// `POST /search` body and `perform_search` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query_text: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub follow_up_queries: Option<Vec<String>>,
    #[serde(default)]
    pub comprehensive: bool,
}

impl SearchRequest {
    pub fn new(query_text: impl Into<String>, max_results: usize) -> Self {
        Self {
            query_text: query_text.into(),
            max_results,
            session_id: None,
            follow_up_queries: None,
            comprehensive: false,
        }
    }
}

/// One web search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    /// Host the result was served from.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub query: String,
    pub total_results: usize,
}

// =============================================================================
// KNOWLEDGE EXTRACTION
// =============================================================================

/// Body shared by `/extract`, `/credibility` and `/trends`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionRequest {
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
}

/// Category of an extracted insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Overview,
    Methodology,
    Metric,
    Domain,
    Institution,
    Findings,
    Significance,
    #[serde(other)]
    General,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Overview => "overview",
            InsightType::Methodology => "methodology",
            InsightType::Metric => "metric",
            InsightType::Domain => "domain",
            InsightType::Institution => "institution",
            InsightType::Findings => "findings",
            InsightType::Significance => "significance",
            InsightType::General => "general",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchInsight {
    pub id: String,
    pub content: String,
    pub confidence: f64,
    #[serde(default)]
    pub source_urls: Vec<String>,
    pub insight_type: InsightType,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InsightBatch {
    pub insights: Vec<ResearchInsight>,
    pub total_insights: usize,
}

impl From<Vec<ResearchInsight>> for InsightBatch {
    fn from(insights: Vec<ResearchInsight>) -> Self {
        Self {
            total_insights: insights.len(),
            insights,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredibilityAnalysis {
    pub total_sources: usize,
    pub high_credibility: usize,
    pub medium_credibility: usize,
    pub low_credibility: usize,
    /// Result count per host.
    pub source_breakdown: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredibilityResponse {
    pub analysis: CredibilityAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrendReport {
    /// Trend keywords that appeared at least once, most frequent first.
    pub trends: Vec<String>,
    pub keyword_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsightStats {
    pub total_insights: usize,
    pub insights_by_type: BTreeMap<String, usize>,
}

// =============================================================================
// RESEARCH AGGREGATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub topic: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub topic: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRequest {
    pub session_id: String,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub insights: Vec<ResearchInsight>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateAck {
    pub status: String,
    pub total_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub session_id: String,
}

/// Source counts by category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceCategories {
    pub academic: usize,
    pub government: usize,
    pub commercial: usize,
    pub news: usize,
    pub other: usize,
}

impl SourceCategories {
    pub fn total(&self) -> usize {
        self.academic + self.government + self.commercial + self.news + self.other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    pub session_id: String,
    pub topic: String,
    pub generated_at: DateTime<Utc>,
    pub total_sources: usize,
    pub unique_domains: usize,
    pub top_domains: Vec<String>,
    pub average_relevance: f64,
    pub source_types: SourceCategories,
    pub research_coverage: String,
    pub session_duration: String,
    pub total_insights: usize,
    pub executive_summary: String,
    pub key_findings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub report: ResearchReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub topic: String,
    pub started_at: DateTime<Utc>,
    pub sources_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionList {
    pub sessions: Vec<SessionSummary>,
}
