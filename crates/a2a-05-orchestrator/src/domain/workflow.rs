use crate::domain::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use shared_types::{CredibilityAnalysis, InsightBatch, ResearchReport, SearchResult, ServiceRole};
use std::fmt;
use std::time::Duration;

/// One remote call of the research workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    StartSession,
    Search,
    ExtractInsights,
    AnalyzeCredibility,
    Aggregate,
    GenerateReport,
}

impl Step {
    /// Workflow order.
    pub const ALL: [Step; 6] = [
        Step::StartSession,
        Step::Search,
        Step::ExtractInsights,
        Step::AnalyzeCredibility,
        Step::Aggregate,
        Step::GenerateReport,
    ];

    pub fn role(&self) -> ServiceRole {
        match self {
            Step::Search => ServiceRole::WebSearch,
            Step::ExtractInsights | Step::AnalyzeCredibility => ServiceRole::KnowledgeExtraction,
            Step::StartSession | Step::Aggregate | Step::GenerateReport => {
                ServiceRole::ResearchAggregation
            }
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Step::StartSession => "/session",
            Step::Search => "/search",
            Step::ExtractInsights => "/extract",
            Step::AnalyzeCredibility => "/credibility",
            Step::Aggregate => "/aggregate",
            Step::GenerateReport => "/report",
        }
    }

    /// Steps that may run external compute get the long timeout.
    pub fn timeout(&self, config: &OrchestratorConfig) -> Duration {
        match self {
            Step::Search | Step::ExtractInsights | Step::GenerateReport => config.long_step_timeout,
            Step::AnalyzeCredibility | Step::StartSession | Step::Aggregate => {
                config.short_step_timeout
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::StartSession => "session",
            Step::Search => "search",
            Step::ExtractInsights => "extract",
            Step::AnalyzeCredibility => "credibility",
            Step::Aggregate => "aggregate",
            Step::GenerateReport => "report",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one research run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOutcome {
    pub session_id: String,
    pub results: Vec<SearchResult>,
    pub insights: InsightBatch,
    pub credibility: CredibilityAnalysis,
    pub report: ResearchReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_timeouts() {
        let config = OrchestratorConfig::default();
        let long: Vec<_> = Step::ALL
            .iter()
            .filter(|s| s.timeout(&config).as_secs() == 60)
            .map(Step::as_str)
            .collect();
        assert_eq!(long, vec!["search", "extract", "report"]);
        assert_eq!(Step::Aggregate.timeout(&config).as_secs(), 30);
    }

    #[test]
    fn test_step_roles() {
        assert_eq!(Step::Search.role().service_name(), "web-search");
        assert_eq!(Step::AnalyzeCredibility.role().service_name(), "knowledge-extraction");
        assert_eq!(Step::StartSession.role().service_name(), "research-aggregation");
    }
}
