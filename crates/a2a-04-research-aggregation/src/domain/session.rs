use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{ResearchInsight, SearchResult, SessionInfo, SessionSummary};

/// Accumulated state of one research run. Append-only until a report
/// reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSession {
    pub session_id: String,
    pub topic: String,
    pub started_at: DateTime<Utc>,
    pub search_results: Vec<SearchResult>,
    pub insights: Vec<ResearchInsight>,
    pub sources_analyzed: usize,
}

impl ResearchSession {
    pub fn new(session_id: impl Into<String>, topic: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            topic: topic.into(),
            started_at,
            search_results: Vec::new(),
            insights: Vec::new(),
            sources_analyzed: 0,
        }
    }

    pub fn append(&mut self, results: Vec<SearchResult>, insights: Vec<ResearchInsight>) {
        self.sources_analyzed += results.len();
        self.search_results.extend(results);
        self.insights.extend(insights);
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            topic: self.topic.clone(),
            started_at: self.started_at,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            topic: self.topic.clone(),
            started_at: self.started_at,
            sources_analyzed: self.sources_analyzed,
        }
    }
}
