use crate::domain::{build_report, AggregationError, ResearchSession};
use chrono::Utc;
use parking_lot::RwLock;
use shared_types::{
    AggregateAck, AggregateRequest, ResearchReport, SessionInfo, SessionList, SessionRequest,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Session store shared by the HTTP API and the envelope handlers.
#[derive(Clone, Default)]
pub struct AggregationService {
    sessions: Arc<RwLock<HashMap<String, ResearchSession>>>,
}

impl AggregationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session. A caller-supplied id that already exists is reset.
    pub fn start_session(&self, request: SessionRequest) -> SessionInfo {
        let session_id = request
            .session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let session = ResearchSession::new(session_id.clone(), request.topic, Utc::now());
        let info = session.info();
        self.sessions.write().insert(session_id, session);
        info!(session = %info.session_id, topic = %info.topic, "[research-aggregation] Session started");
        info
    }

    pub fn aggregate(&self, request: AggregateRequest) -> Result<AggregateAck, AggregationError> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(&request.session_id)
            .ok_or_else(|| AggregationError::SessionNotFound(request.session_id.clone()))?;
        let added = request.results.len();
        session.append(request.results, request.insights);
        info!(
            session = %request.session_id,
            added,
            total = session.search_results.len(),
            "[research-aggregation] Results aggregated"
        );
        Ok(AggregateAck {
            status: "aggregated".to_string(),
            total_results: session.search_results.len(),
        })
    }

    pub fn report(&self, session_id: &str) -> Result<ResearchReport, AggregationError> {
        let session = self.session(session_id)?;
        let report = build_report(&session, Utc::now());
        info!(
            session = %session_id,
            sources = report.total_sources,
            "[research-aggregation] Report generated"
        );
        Ok(report)
    }

    pub fn session(&self, session_id: &str) -> Result<ResearchSession, AggregationError> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| AggregationError::SessionNotFound(session_id.to_string()))
    }

    /// Summaries ordered by start time.
    pub fn list(&self) -> SessionList {
        let mut sessions: Vec<_> = self.sessions.read().values().map(ResearchSession::summary).collect();
        sessions.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        SessionList { sessions }
    }
}
