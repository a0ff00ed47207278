//! Pattern-based insight extraction.
//!
//! Each search result yields an overview insight from its title plus one
//! insight per entity pattern that matches the title or snippet:
//!
//! | Pattern | Insight type | Confidence |
//! |---|---|---|
//! | methodology | `methodology` | 0.80 |
//! | domain | `domain` | 0.90 |
//! | institution | `institution` | 0.85 |

use crate::domain::KnowledgeError;
use chrono::{DateTime, Utc};
use regex::Regex;
use shared_types::{InsightType, ResearchInsight, SearchResult};
use uuid::Uuid;

const METHODOLOGY: &str =
    r"(?i)\b(machine learning|neural networks?|deep learning|algorithms?|models?|AI|artificial intelligence)\b";
const DOMAIN: &str =
    r"(?i)\b(climate|weather|quantum|cryptography|security|prediction|forecasting|energy|memory safety)\b";
const INSTITUTION: &str = r"(?i)\b(NIST|Nature|Science|IEEE|ACM|MIT|Stanford|Google|Microsoft)\b";

const OVERVIEW_CONFIDENCE: f64 = 0.8;

struct EntityPattern {
    regex: Regex,
    insight_type: InsightType,
    label: &'static str,
    confidence: f64,
}

pub struct InsightExtractor {
    patterns: Vec<EntityPattern>,
}

impl InsightExtractor {
    pub fn new() -> Result<Self, KnowledgeError> {
        let pattern = |source: &str, insight_type, label, confidence| -> Result<EntityPattern, KnowledgeError> {
            Ok(EntityPattern {
                regex: Regex::new(source)?,
                insight_type,
                label,
                confidence,
            })
        };
        Ok(Self {
            patterns: vec![
                pattern(METHODOLOGY, InsightType::Methodology, "Methodologies found", 0.8)?,
                pattern(DOMAIN, InsightType::Domain, "Research domains", 0.9)?,
                pattern(INSTITUTION, InsightType::Institution, "Key institutions", 0.85)?,
            ],
        })
    }

    /// Insights for one result, overview first.
    pub fn extract(&self, result: &SearchResult, at: DateTime<Utc>) -> Vec<ResearchInsight> {
        let content = format!("{} {}", result.snippet, result.title);
        let insight = |content: String, insight_type, confidence| ResearchInsight {
            id: Uuid::new_v4().to_string(),
            content,
            confidence,
            source_urls: vec![result.url.clone()],
            insight_type,
            extracted_at: at,
        };

        let mut insights = Vec::new();
        if !result.title.trim().is_empty() {
            insights.push(insight(
                format!("Source discusses: {}", result.title),
                InsightType::Overview,
                OVERVIEW_CONFIDENCE,
            ));
        }

        for p in &self.patterns {
            let mut found: Vec<&str> = Vec::new();
            for m in p.regex.find_iter(&content) {
                if !found.iter().any(|f| f.eq_ignore_ascii_case(m.as_str())) {
                    found.push(m.as_str());
                }
            }
            if !found.is_empty() {
                insights.push(insight(
                    format!("{}: {}", p.label, found.join(", ")),
                    p.insight_type,
                    p.confidence,
                ));
            }
        }
        insights
    }

    pub fn extract_all(&self, results: &[SearchResult], at: DateTime<Utc>) -> Vec<ResearchInsight> {
        results.iter().flat_map(|r| self.extract(r, at)).collect()
    }
}
