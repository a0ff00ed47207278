use crate::domain::{
    analyze_credibility, identify_trends, InsightExtractor, InsightStore, KnowledgeError,
};
use chrono::Utc;
use shared_types::{CredibilityAnalysis, InsightBatch, InsightStats, SearchResult, TrendReport};
use std::sync::Arc;
use tracing::info;

/// Shared by the HTTP API and the envelope handlers.
#[derive(Clone)]
pub struct KnowledgeService {
    extractor: Arc<InsightExtractor>,
    store: Arc<InsightStore>,
}

impl KnowledgeService {
    pub fn new() -> Result<Self, KnowledgeError> {
        Ok(Self {
            extractor: Arc::new(InsightExtractor::new()?),
            store: Arc::new(InsightStore::new()),
        })
    }

    /// Extracts insights from `results` and remembers them.
    pub fn extract(&self, results: &[SearchResult]) -> InsightBatch {
        let insights = self.extractor.extract_all(results, Utc::now());
        self.store.insert_all(&insights);
        info!(
            sources = results.len(),
            insights = insights.len(),
            "[knowledge-extraction] Extracted insights"
        );
        InsightBatch::from(insights)
    }

    pub fn credibility(&self, results: &[SearchResult]) -> CredibilityAnalysis {
        let analysis = analyze_credibility(results);
        info!(
            sources = analysis.total_sources,
            high = analysis.high_credibility,
            "[knowledge-extraction] Analyzed credibility"
        );
        analysis
    }

    pub fn trends(&self, results: &[SearchResult]) -> TrendReport {
        let report = identify_trends(results);
        info!(trends = report.trends.len(), "[knowledge-extraction] Identified trends");
        report
    }

    pub fn stats(&self) -> InsightStats {
        self.store.stats()
    }

    pub fn store(&self) -> &InsightStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_updates_stats() {
        let service = KnowledgeService::new().unwrap();
        let result = SearchResult {
            id: "r".into(),
            title: "Quantum Computing".into(),
            url: "https://www.science.org/doi/1".into(),
            snippet: "New algorithms from NIST".into(),
            source: "www.science.org".into(),
            search_query: "q".into(),
            relevance_score: 0.9,
            extracted_at: None,
        };
        let batch = service.extract(&[result.clone()]);
        assert_eq!(batch.total_insights, batch.insights.len());
        assert_eq!(service.stats().total_insights, batch.total_insights);

        let clone = service.clone();
        clone.extract(&[result]);
        assert_eq!(service.stats().total_insights, 2 * batch.total_insights);
    }
}
