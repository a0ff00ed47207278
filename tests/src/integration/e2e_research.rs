//! # End-to-End Research Tests
//!
//! The orchestrated workflow against a live registry and live services:
//!
//! ```text
//! research-client ──GET /services──▶ registry
//!        │
//!        ├──POST /session ─────▶ research-aggregation
//!        ├──POST /search ──────▶ web-search
//!        ├──POST /extract ─────▶ knowledge-extraction
//!        ├──POST /credibility ─▶ knowledge-extraction
//!        ├──POST /aggregate ───▶ research-aggregation
//!        └──POST /report ──────▶ research-aggregation
//! ```
//!
//! ## Test Categories
//!
//! 1. **Happy Path**: every step over signed HTTP
//! 2. **Missing Collaborator**: fails at discovery, before any call
//! 3. **Stopped Collaborator**: a listed but dead service fails the step

#[cfg(test)]
mod tests {
    use a2a_05_orchestrator::{
        http_orchestrator, OrchestratorConfig, OrchestratorError, UnavailableReason,
    };
    use shared_types::ServiceRole;

    use crate::integration::harness::Cluster;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_research_report_matches_session() {
        let mut cluster = Cluster::start().await;
        for role in ServiceRole::ALL {
            cluster.serve(role).await;
        }

        let orchestrator = http_orchestrator(
            &cluster.registry_url,
            cluster.config.codec(),
            OrchestratorConfig::default(),
        )
        .unwrap();
        let outcome = orchestrator.run_research("machine learning", 5).await.unwrap();

        assert!(!outcome.results.is_empty());
        assert_eq!(outcome.report.session_id, outcome.session_id);
        assert_eq!(outcome.report.total_sources, outcome.results.len());
        assert_eq!(outcome.report.total_insights, outcome.insights.total_insights);
        assert_eq!(outcome.credibility.total_sources, outcome.results.len());
        assert_eq!(orchestrator.discovered().len(), ServiceRole::ALL.len());

        let stored = cluster.container.aggregation.session(&outcome.session_id).unwrap();
        assert_eq!(stored.sources_analyzed, outcome.results.len());

        cluster.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unregistered_service_fails_before_any_call() {
        let mut cluster = Cluster::start().await;
        cluster.serve(ServiceRole::WebSearch).await;
        cluster.serve(ServiceRole::ResearchAggregation).await;

        let orchestrator = http_orchestrator(
            &cluster.registry_url,
            cluster.config.codec(),
            OrchestratorConfig::default(),
        )
        .unwrap();
        let err = orchestrator.run_research("rust", 3).await.unwrap_err();

        assert_eq!(
            err,
            OrchestratorError::ServiceUnavailable {
                service: ServiceRole::KnowledgeExtraction.service_name().to_string(),
                reason: UnavailableReason::NeverDiscovered,
            }
        );
        // No session was opened: the workflow never reached its first step.
        assert!(cluster.container.aggregation.list().sessions.is_empty());

        cluster.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_registered_but_dead_service_is_call_failure() {
        let mut cluster = Cluster::start().await;
        for role in ServiceRole::ALL {
            cluster.serve(role).await;
        }
        // A record pointing at a closed port: listed, never reachable.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let dead_port = listener.local_addr().unwrap().port();
        drop(listener);
        cluster.registry.register(shared_types::ServiceRegistration::new(
            ServiceRole::WebSearch.service_name(),
            "127.0.0.1",
            dead_port,
        ));

        let orchestrator = http_orchestrator(
            &cluster.registry_url,
            cluster.config.codec(),
            OrchestratorConfig::default(),
        )
        .unwrap();
        let err = orchestrator.run_research("rust", 3).await.unwrap_err();

        match err {
            OrchestratorError::ServiceUnavailable {
                service,
                reason: UnavailableReason::CallFailed(_),
            } => assert_eq!(service, ServiceRole::WebSearch.service_name()),
            other => panic!("expected call failure, got {other:?}"),
        }

        cluster.shutdown().await;
    }
}
