//! # Service Container
//!
//! Holds one instance of each collaborator's service state. The same
//! instance backs its HTTP router and its actor handlers, so both surfaces
//! observe the same sessions and insights.

use std::sync::Arc;

use axum::Router;
use shared_bus::ServiceActor;
use shared_types::{AuthCodec, ServiceRole};
use tracing::info;

use a2a_02_web_search::{CatalogSearchBackend, WebSearchService};
use a2a_03_knowledge_extraction::{KnowledgeError, KnowledgeService};
use a2a_04_research_aggregation::AggregationService;

use crate::container::config::RuntimeConfig;

pub struct ServiceContainer {
    pub codec: AuthCodec,
    pub web_search: WebSearchService,
    pub knowledge: KnowledgeService,
    pub aggregation: AggregationService,
}

impl ServiceContainer {
    /// Builds every collaborator with its built-in backend.
    pub fn new(config: &RuntimeConfig) -> Result<Self, KnowledgeError> {
        Ok(Self {
            codec: config.codec(),
            web_search: WebSearchService::new(Arc::new(CatalogSearchBackend::default())),
            knowledge: KnowledgeService::new()?,
            aggregation: AggregationService::new(),
        })
    }

    /// HTTP app for `role`: protected routes plus `/health`.
    pub fn router(&self, role: ServiceRole) -> Router {
        match role {
            ServiceRole::WebSearch => {
                a2a_02_web_search::router(self.web_search.clone(), self.codec.clone())
            }
            ServiceRole::KnowledgeExtraction => {
                a2a_03_knowledge_extraction::router(self.knowledge.clone(), self.codec.clone())
            }
            ServiceRole::ResearchAggregation => {
                a2a_04_research_aggregation::router(self.aggregation.clone(), self.codec.clone())
            }
        }
    }

    /// Actor named after `role` with that role's handlers installed.
    pub fn actor(&self, role: ServiceRole) -> ServiceActor {
        let actor = ServiceActor::new(role.service_name(), self.codec.clone());
        match role {
            ServiceRole::WebSearch => {
                a2a_02_web_search::register_handlers(&actor, self.web_search.clone())
            }
            ServiceRole::KnowledgeExtraction => {
                a2a_03_knowledge_extraction::register_handlers(&actor, self.knowledge.clone())
            }
            ServiceRole::ResearchAggregation => {
                a2a_04_research_aggregation::register_handlers(&actor, self.aggregation.clone())
            }
        }
        info!(service = %role, "Actor handlers installed");
        actor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::MessageKind;

    #[test]
    fn test_actors_handle_their_kinds() {
        let container = ServiceContainer::new(&RuntimeConfig::default()).unwrap();

        let search = container.actor(ServiceRole::WebSearch);
        assert_eq!(search.name(), "web-search");
        assert!(search.handles(MessageKind::PerformSearch));
        assert!(!search.handles(MessageKind::GenerateReport));

        let knowledge = container.actor(ServiceRole::KnowledgeExtraction);
        for kind in [
            MessageKind::ExtractInsights,
            MessageKind::AnalyzeCredibility,
            MessageKind::IdentifyTrends,
        ] {
            assert!(knowledge.handles(kind));
        }

        let aggregation = container.actor(ServiceRole::ResearchAggregation);
        for kind in [
            MessageKind::StartResearchSession,
            MessageKind::AggregateResults,
            MessageKind::GenerateReport,
        ] {
            assert!(aggregation.handles(kind));
        }
    }
}
