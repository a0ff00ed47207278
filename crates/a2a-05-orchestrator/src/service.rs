//! # Orchestrator
//!
//! Drives the research workflow against discovered services:
//!
//! ```text
//! discover ─▶ session ─▶ search ─▶ extract ─▶ credibility ─▶ aggregate ─▶ report
//! ```
//!
//! Every step awaits the actual response of its call. A step whose service
//! was never discovered fails without sending anything; a call that does
//! not complete or answers non-2xx aborts the run. There are no retries.

use crate::domain::{OrchestratorConfig, OrchestratorError, ResearchOutcome, Step, UnavailableReason};
use crate::ports::{ServiceDirectory, WorkflowTransport};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{
    AggregateAck, AggregateRequest, CredibilityAnalysis, CredibilityResponse, ExtractionRequest,
    InsightBatch, ReportRequest, ReportResponse, ResearchInsight, ResearchReport, SearchRequest,
    SearchResponse, SearchResult, ServiceRole, ServiceStatus, SessionInfo, SessionRequest,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct Orchestrator {
    directory: Arc<dyn ServiceDirectory>,
    transport: Arc<dyn WorkflowTransport>,
    config: OrchestratorConfig,
    /// Service name → base URL, as of the last discovery.
    services: RwLock<BTreeMap<String, String>>,
}

impl Orchestrator {
    pub fn new(
        directory: Arc<dyn ServiceDirectory>,
        transport: Arc<dyn WorkflowTransport>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            directory,
            transport,
            config,
            services: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Name → URL map from the last [`discover_all`](Self::discover_all).
    pub fn discovered(&self) -> BTreeMap<String, String> {
        self.services.read().clone()
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    /// Replaces the discovered set with the registry's current list,
    /// filtered by the configured policy. Returns how many were accepted.
    ///
    /// Fails with [`OrchestratorError::Discovery`] when the registry cannot
    /// be listed or nothing was accepted.
    pub async fn discover_all(&self) -> Result<usize, OrchestratorError> {
        let records = self
            .directory
            .list_services()
            .await
            .map_err(|e| OrchestratorError::Discovery(e.to_string()))?;
        info!(registered = records.len(), "[research-client] Registry listed services");

        let mut accepted = BTreeMap::new();
        for record in records {
            if !self.config.policy.accepts(record.status) {
                debug!(service = %record.service_name, status = %record.status, "[research-client] Skipping service");
                continue;
            }
            if record.status != ServiceStatus::Healthy {
                warn!(service = %record.service_name, status = %record.status, "[research-client] Accepting service that is not reported healthy");
            }
            accepted.insert(record.service_name, record.url);
        }

        let count = accepted.len();
        *self.services.write() = accepted;
        if count == 0 {
            return Err(OrchestratorError::Discovery("no services available".to_string()));
        }
        info!(discovered = count, "[research-client] Discovery complete");
        Ok(count)
    }

    fn endpoint(&self, role: ServiceRole) -> Result<String, OrchestratorError> {
        self.services
            .read()
            .get(role.service_name())
            .cloned()
            .ok_or_else(|| OrchestratorError::never_discovered(role.service_name()))
    }

    // =========================================================================
    // STEPS
    // =========================================================================

    async fn call<B, R>(&self, step: Step, body: &B) -> Result<R, OrchestratorError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let role = step.role();
        let base = self.endpoint(role)?;
        let url = format!("{}{}", base.trim_end_matches('/'), step.path());
        let body = serde_json::to_value(body).map_err(|e| OrchestratorError::Decode {
            step,
            reason: e.to_string(),
        })?;

        debug!(step = %step, url = %url, "[research-client] Calling");
        let response = self
            .transport
            .post_json(&url, &body, step.timeout(&self.config))
            .await
            .map_err(|e| OrchestratorError::ServiceUnavailable {
                service: role.service_name().to_string(),
                reason: UnavailableReason::CallFailed(e.to_string()),
            })?;

        if !response.is_success() {
            warn!(step = %step, status = response.status, "[research-client] Step failed");
            return Err(OrchestratorError::StepFailed {
                step,
                status: response.status,
                body: response.body,
            });
        }
        response.json().map_err(|e| OrchestratorError::Decode {
            step,
            reason: e.to_string(),
        })
    }

    pub async fn start_session(&self, topic: &str) -> Result<SessionInfo, OrchestratorError> {
        let request = SessionRequest {
            topic: topic.to_string(),
            session_id: None,
        };
        self.call(Step::StartSession, &request).await
    }

    /// Comprehensive search (follow-up queries included).
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, OrchestratorError> {
        let mut request = SearchRequest::new(query, max_results);
        request.comprehensive = true;
        let response: SearchResponse = self.call(Step::Search, &request).await?;
        Ok(response.results)
    }

    pub async fn extract_insights(
        &self,
        results: &[SearchResult],
    ) -> Result<InsightBatch, OrchestratorError> {
        self.call(Step::ExtractInsights, &extraction_request(results)).await
    }

    pub async fn analyze_credibility(
        &self,
        results: &[SearchResult],
    ) -> Result<CredibilityAnalysis, OrchestratorError> {
        let response: CredibilityResponse = self
            .call(Step::AnalyzeCredibility, &extraction_request(results))
            .await?;
        Ok(response.analysis)
    }

    pub async fn aggregate(
        &self,
        session_id: &str,
        results: Vec<SearchResult>,
        insights: Vec<ResearchInsight>,
    ) -> Result<AggregateAck, OrchestratorError> {
        let request = AggregateRequest {
            session_id: session_id.to_string(),
            results,
            insights,
        };
        self.call(Step::Aggregate, &request).await
    }

    pub async fn generate_report(&self, session_id: &str) -> Result<ResearchReport, OrchestratorError> {
        let request = ReportRequest {
            session_id: session_id.to_string(),
        };
        let response: ReportResponse = self.call(Step::GenerateReport, &request).await?;
        Ok(response.report)
    }

    // =========================================================================
    // WORKFLOW
    // =========================================================================

    /// Discovers services and runs every step in order.
    ///
    /// All three collaborators must be discovered before the first call is
    /// made.
    pub async fn run_research(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<ResearchOutcome, OrchestratorError> {
        self.discover_all().await?;
        for role in ServiceRole::ALL {
            self.endpoint(role)?;
        }

        let session = self.start_session(query).await?;
        info!(session = %session.session_id, query = %query, "[research-client] Research started");

        let results = self.search(query, max_results).await?;
        info!(results = results.len(), "[research-client] Search complete");

        let insights = self.extract_insights(&results).await?;
        let credibility = self.analyze_credibility(&results).await?;
        info!(
            insights = insights.total_insights,
            high_credibility = credibility.high_credibility,
            "[research-client] Analysis complete"
        );

        let ack = self
            .aggregate(&session.session_id, results.clone(), insights.insights.clone())
            .await?;
        debug!(total = ack.total_results, "[research-client] Aggregated");

        let report = self.generate_report(&session.session_id).await?;
        info!(
            session = %report.session_id,
            sources = report.total_sources,
            coverage = %report.research_coverage,
            "[research-client] Report ready"
        );

        Ok(ResearchOutcome {
            session_id: session.session_id,
            results,
            insights,
            credibility,
            report,
        })
    }
}

fn extraction_request(results: &[SearchResult]) -> ExtractionRequest {
    ExtractionRequest {
        search_results: results.to_vec(),
    }
}
