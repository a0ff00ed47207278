use parking_lot::RwLock;
use shared_types::{InsightStats, ResearchInsight};
use std::collections::HashMap;

/// Every insight extracted during the process lifetime, keyed by id.
#[derive(Debug, Default)]
pub struct InsightStore {
    insights: RwLock<HashMap<String, ResearchInsight>>,
}

impl InsightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_all(&self, insights: &[ResearchInsight]) {
        let mut map = self.insights.write();
        for insight in insights {
            map.insert(insight.id.clone(), insight.clone());
        }
    }

    pub fn get(&self, id: &str) -> Option<ResearchInsight> {
        self.insights.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.insights.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> InsightStats {
        let map = self.insights.read();
        let mut stats = InsightStats {
            total_insights: map.len(),
            ..Default::default()
        };
        for insight in map.values() {
            *stats
                .insights_by_type
                .entry(insight.insight_type.as_str().to_string())
                .or_default() += 1;
        }
        stats
    }
}
