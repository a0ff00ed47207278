//! # In-Process Research Choreography
//!
//! Runs the research workflow with every collaborator as an actor behind a
//! [`LocalRouter`]. The client is an actor too: collaborators answer it with
//! envelopes, and each stage waits for the envelope that completes it.
//!
//! ```text
//! research-client ──start_web_research_session──▶ research-aggregation
//! research-client ──perform_search──────────────▶ web-search
//!        ◀──────────────aggregate_web_results (results)──────┘
//! research-client ──extract_web_insights────────▶ knowledge-extraction
//!        ◀──────────────aggregate_web_results (insights)─────┘
//! research-client ──aggregate_web_results───────▶ research-aggregation
//! research-client ──generate_web_report─────────▶ research-aggregation
//!        ◀──────────────web_report_ready─────────────────────┘
//! ```
//!
//! The last two messages come from one sender through one router, so the
//! aggregation inbox sees them in that order.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use shared_bus::{handler_fn, HandlerError, LocalRouter, Outbound, RouteError, ServiceActor};
use shared_types::{
    AggregateRequest, Envelope, ExtractionRequest, MessageKind, Payload, PayloadError,
    ReportRequest, ReportResponse, ResearchInsight, SearchRequest, SearchResult, ServiceRole,
    SessionRequest,
};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::container::ServiceContainer;

/// Name the demo client signs its envelopes with.
pub const DEMO_CLIENT: &str = "research-client";

const CALLBACK_FIELD: &str = "callback_service";

#[derive(Debug, Error)]
pub enum ChoreographyError {
    #[error("Routing failed: {0}")]
    Route(#[from] RouteError),

    #[error("Bad reply payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("Failed to encode {0} payload")]
    Encode(MessageKind),

    #[error("No reply for {stage} within {timeout:?}")]
    Timeout { stage: &'static str, timeout: Duration },

    #[error("Client inbox closed")]
    Closed,
}

/// What the choreography produced.
#[derive(Debug, Clone)]
pub struct ChoreographyOutcome {
    pub session_id: String,
    pub results: Vec<SearchResult>,
    pub insights: Vec<ResearchInsight>,
    pub report: ReportResponse,
}

/// Actors, router and the client's reply channel.
pub struct ResearchChoreography {
    router: Arc<LocalRouter>,
    client: Arc<ServiceActor>,
    collaborators: Vec<Arc<ServiceActor>>,
    replies: mpsc::UnboundedReceiver<Envelope>,
    stage_timeout: Duration,
}

impl ResearchChoreography {
    pub fn new(container: &ServiceContainer, poll_interval: Duration, stage_timeout: Duration) -> Self {
        let router = Arc::new(LocalRouter::new());

        let (tx, replies) = mpsc::unbounded_channel();
        let client = Arc::new(
            ServiceActor::new(DEMO_CLIENT, container.codec.clone()).with_poll_interval(poll_interval),
        );
        for kind in [MessageKind::AggregateResults, MessageKind::ReportReady] {
            let tx = tx.clone();
            client.register_handler(
                kind,
                handler_fn(move |envelope: Envelope| {
                    let tx = tx.clone();
                    async move {
                        tx.send(envelope)
                            .map_err(|_| HandlerError::Failed("reply channel closed".to_string()))?;
                        Ok(Vec::<Outbound>::new())
                    }
                }),
            );
        }
        router.attach(client.clone());

        let collaborators: Vec<_> = ServiceRole::ALL
            .iter()
            .map(|role| Arc::new(container.actor(*role).with_poll_interval(poll_interval)))
            .collect();
        for actor in &collaborators {
            router.attach(actor.clone());
        }

        Self {
            router,
            client,
            collaborators,
            replies,
            stage_timeout,
        }
    }

    /// Runs one research query to completion and stops every loop.
    pub async fn run(
        mut self,
        topic: &str,
        max_results: usize,
    ) -> Result<ChoreographyOutcome, ChoreographyError> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tasks = self.spawn_loops(shutdown_rx);

        let outcome = self.drive(topic, max_results).await;

        for actor in self.collaborators.iter().chain(std::iter::once(&self.client)) {
            actor.stop();
        }
        shutdown_tx.send_replace(true);
        for task in tasks {
            let _ = task.await;
        }
        info!(
            delivered = self.router.delivered(),
            undeliverable = self.router.undeliverable(),
            "Choreography finished"
        );
        outcome
    }

    fn spawn_loops(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::new();
        let router = self.router.clone();
        tasks.push(tokio::spawn(async move { router.run(shutdown).await }));
        for actor in self.collaborators.iter().chain(std::iter::once(&self.client)) {
            let actor = actor.clone();
            tasks.push(tokio::spawn(async move {
                if let Err(e) = actor.run().await {
                    warn!(service = %actor.name(), error = %e, "Dispatch loop not started");
                }
            }));
        }
        tasks
    }

    async fn drive(
        &mut self,
        topic: &str,
        max_results: usize,
    ) -> Result<ChoreographyOutcome, ChoreographyError> {
        let session_id = Uuid::new_v4().to_string();
        let aggregation = ServiceRole::ResearchAggregation.service_name();
        info!(session = %session_id, topic = %topic, "Starting in-process research");

        self.emit(
            aggregation,
            MessageKind::StartResearchSession,
            &SessionRequest {
                topic: topic.to_string(),
                session_id: Some(session_id.clone()),
            },
            None,
        )?;

        let mut search = SearchRequest::new(topic, max_results);
        search.session_id = Some(session_id.clone());
        search.comprehensive = true;
        self.emit(
            ServiceRole::WebSearch.service_name(),
            MessageKind::PerformSearch,
            &search,
            Some(DEMO_CLIENT),
        )?;
        let results = self
            .await_reply("search", MessageKind::AggregateResults)
            .await?
            .decode::<AggregateRequest>()?
            .results;
        info!(results = results.len(), "Search results received");

        let mut extract = serde_json::to_value(ExtractionRequest {
            search_results: results.clone(),
        })
        .map_err(|_| ChoreographyError::Encode(MessageKind::ExtractInsights))?;
        if let Value::Object(map) = &mut extract {
            map.insert("session_id".to_string(), Value::String(session_id.clone()));
        }
        self.emit(
            ServiceRole::KnowledgeExtraction.service_name(),
            MessageKind::ExtractInsights,
            &extract,
            Some(DEMO_CLIENT),
        )?;
        let insights = self
            .await_reply("extract", MessageKind::AggregateResults)
            .await?
            .decode::<AggregateRequest>()?
            .insights;
        info!(insights = insights.len(), "Insights received");

        self.emit(
            aggregation,
            MessageKind::AggregateResults,
            &AggregateRequest {
                session_id: session_id.clone(),
                results: results.clone(),
                insights: insights.clone(),
            },
            None,
        )?;
        self.emit(
            aggregation,
            MessageKind::GenerateReport,
            &ReportRequest {
                session_id: session_id.clone(),
            },
            None,
        )?;
        let report: ReportResponse = self
            .await_reply("report", MessageKind::ReportReady)
            .await?
            .decode()?;
        info!(
            session = %report.report.session_id,
            sources = report.report.total_sources,
            "Report received"
        );

        Ok(ChoreographyOutcome {
            session_id,
            results,
            insights,
            report,
        })
    }

    fn emit<T: Serialize>(
        &self,
        recipient: &str,
        kind: MessageKind,
        body: &T,
        callback: Option<&str>,
    ) -> Result<(), ChoreographyError> {
        let body = serde_json::to_value(body).map_err(|_| ChoreographyError::Encode(kind))?;
        let mut payload: Payload = kind.payload(body);
        if let Some(callback) = callback {
            payload.insert(CALLBACK_FIELD.to_string(), Value::String(callback.to_string()));
        }
        let envelope = self.client.emit(recipient, payload)?;
        debug!(message_id = %envelope.id, recipient = %recipient, kind = %kind, "Emitted");
        Ok(())
    }

    /// Waits for the next reply of `kind`, skipping anything else.
    async fn await_reply(
        &mut self,
        stage: &'static str,
        kind: MessageKind,
    ) -> Result<Envelope, ChoreographyError> {
        let deadline = tokio::time::Instant::now() + self.stage_timeout;
        loop {
            let next = tokio::time::timeout_at(deadline, self.replies.recv())
                .await
                .map_err(|_| ChoreographyError::Timeout {
                    stage,
                    timeout: self.stage_timeout,
                })?;
            let envelope = next.ok_or(ChoreographyError::Closed)?;
            if envelope.kind().ok() == Some(kind) {
                return Ok(envelope);
            }
            debug!(stage, message_id = %envelope.id, "Skipping unrelated reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::RuntimeConfig;

    #[tokio::test]
    async fn test_choreography_produces_report_for_session() {
        let container = ServiceContainer::new(&RuntimeConfig::default()).unwrap();
        let choreography =
            ResearchChoreography::new(&container, Duration::from_millis(50), Duration::from_secs(5));

        let outcome = choreography.run("machine learning", 5).await.unwrap();
        let report = outcome.report.report;
        assert_eq!(report.session_id, outcome.session_id);
        assert_eq!(report.total_sources, outcome.results.len());
        assert!(!outcome.results.is_empty());
        assert_eq!(report.total_insights, outcome.insights.len());

        let stored = container.aggregation.session(&outcome.session_id).unwrap();
        assert_eq!(stored.sources_analyzed, outcome.results.len());
    }
}
