//! In-memory document catalog used as the built-in search backend.

use crate::domain::{SearchError, SearchHit};
use crate::ports::SearchBackend;
use async_trait::async_trait;

/// One searchable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub keywords: Vec<String>,
}

impl CatalogEntry {
    pub fn new(title: &str, url: &str, snippet: &str, keywords: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            snippet: snippet.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Number of query terms found in the keywords, title or snippet.
    fn score(&self, terms: &[String]) -> usize {
        let title = self.title.to_lowercase();
        let snippet = self.snippet.to_lowercase();
        terms
            .iter()
            .filter(|t| {
                self.keywords.iter().any(|k| k == *t) || title.contains(t.as_str()) || snippet.contains(t.as_str())
            })
            .count()
    }
}

/// Keyword-matching backend over a fixed catalog.
///
/// Documents are ranked by how many query terms they match. A query that
/// matches nothing gets a single generic research page so downstream
/// stages always have something to work with.
#[derive(Debug, Clone)]
pub struct CatalogSearchBackend {
    entries: Vec<CatalogEntry>,
}

impl CatalogSearchBackend {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn generic_hit(query: &str) -> SearchHit {
        SearchHit::new(
            format!("Research on {query}"),
            format!("https://example.com/research/{}", query.trim().replace(' ', "-")),
            format!("Comprehensive research and analysis on {query} with latest findings and methodologies."),
        )
    }
}

fn terms(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl SearchBackend for CatalogSearchBackend {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let terms = terms(query);
        let mut scored: Vec<(usize, &CatalogEntry)> = self
            .entries
            .iter()
            .map(|e| (e.score(&terms), e))
            .filter(|(score, _)| *score > 0)
            .collect();
        // Stable sort keeps catalog order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut hits: Vec<SearchHit> = scored
            .into_iter()
            .take(max_results)
            .map(|(_, e)| SearchHit::new(e.title.clone(), e.url.clone(), e.snippet.clone()))
            .collect();

        if hits.is_empty() && max_results > 0 {
            hits.push(Self::generic_hit(query));
        }
        Ok(hits)
    }
}

impl Default for CatalogSearchBackend {
    fn default() -> Self {
        Self::new(vec![
            CatalogEntry::new(
                "Machine Learning for Climate Change Research: A Comprehensive Review",
                "https://www.nature.com/articles/s41558-021-01168-6",
                "This review examines how machine learning techniques are being applied to climate science, including temperature prediction, extreme weather forecasting, and carbon cycle modeling.",
                &["machine", "learning", "climate", "review", "ai"],
            ),
            CatalogEntry::new(
                "Deep Learning Applications in Climate Modeling and Prediction",
                "https://agupubs.onlinelibrary.wiley.com/doi/10.1029/2021GL094765",
                "Neural networks and deep learning are revolutionizing climate prediction models with improved accuracy in weather forecasting and long-term climate projections.",
                &["deep", "learning", "climate", "neural", "prediction"],
            ),
            CatalogEntry::new(
                "AI for Climate: Machine Learning Solutions for Environmental Challenges",
                "https://www.climatechange.ai/papers",
                "A collection of research papers exploring how artificial intelligence and machine learning can address climate change through improved modeling, monitoring, and mitigation strategies.",
                &["ai", "climate", "machine", "learning", "environment"],
            ),
            CatalogEntry::new(
                "Quantum Computing: Progress and Prospects",
                "https://www.science.org/doi/10.1126/science.aam5830",
                "Recent advances in quantum computing hardware and algorithms show promise for solving complex optimization problems and cryptographic challenges.",
                &["quantum", "computing", "hardware", "algorithms"],
            ),
            CatalogEntry::new(
                "Post-Quantum Cryptography: Preparing for the Quantum Era",
                "https://csrc.nist.gov/projects/post-quantum-cryptography",
                "NIST standardization efforts for cryptographic systems that can resist attacks from quantum computers.",
                &["quantum", "cryptography", "nist", "security"],
            ),
            CatalogEntry::new(
                "Quantum Error Correction Below the Surface Code Threshold",
                "https://arxiv.org/abs/2408.13687",
                "A novel demonstration of logical qubits whose error rates fall as the code distance grows, an emerging milestone for fault-tolerant quantum computing.",
                &["quantum", "error", "correction", "qubits"],
            ),
            CatalogEntry::new(
                "Memory Safety in Systems Programming",
                "https://dl.acm.org/doi/10.1145/3591284",
                "A study of memory-safe systems languages and their effect on vulnerability rates in large codebases, using empirical data from recent releases.",
                &["rust", "memory", "safety", "systems", "programming"],
            ),
            CatalogEntry::new(
                "Renewable Energy Grid Integration",
                "https://www.energy.gov/eere/renewable-grid-integration",
                "Government analysis of methods for integrating wind and solar generation into the electric grid, including storage and forecasting.",
                &["renewable", "energy", "grid", "solar", "wind"],
            ),
            CatalogEntry::new(
                "Breakthrough Battery Chemistries Reach the Market",
                "https://www.nytimes.com/2024/03/01/business/energy-batteries.html",
                "News coverage of the latest battery chemistries moving from laboratories into commercial energy storage.",
                &["battery", "energy", "storage", "news"],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ranks_by_matching_terms() {
        let backend = CatalogSearchBackend::default();
        let hits = backend.search("machine learning climate", 10).await.unwrap();
        assert!(hits.len() >= 3);
        assert!(hits.iter().all(|h| !h.url.contains("example.com")));
        assert!(hits[0].title.contains("Machine Learning"));
    }

    #[tokio::test]
    async fn test_respects_max_results() {
        let backend = CatalogSearchBackend::default();
        let hits = backend.search("quantum", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_unmatched_query_gets_generic_hit() {
        let backend = CatalogSearchBackend::default();
        let hits = backend.search("medieval pottery", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://example.com/research/medieval-pottery");
    }
}
