//! HTTP API. Every route except `/health` requires signed headers; an
//! unknown session answers 404 `{"detail": "Session not found"}`.

use crate::domain::{AggregationError, ResearchSession};
use crate::service::AggregationService;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use shared_transport::{health_routes, ApiError, AuthenticatedService, SignatureAuthLayer};
use shared_types::{
    AggregateAck, AggregateRequest, AuthCodec, ReportRequest, ReportResponse, ServiceRole,
    SessionInfo, SessionList, SessionRequest,
};
use tracing::debug;

impl From<AggregationError> for ApiError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::SessionNotFound(_) => ApiError::not_found("Session not found"),
        }
    }
}

pub fn router(service: AggregationService, codec: AuthCodec) -> Router {
    Router::new()
        .route("/session", post(start_session))
        .route("/aggregate", post(aggregate))
        .route("/report", post(report))
        .route("/sessions", get(list_sessions))
        .route("/sessions/:session_id", get(get_session))
        .route_layer(SignatureAuthLayer::new(codec))
        .with_state(service)
        .merge(health_routes(ServiceRole::ResearchAggregation.service_name()))
}

async fn start_session(
    State(service): State<AggregationService>,
    Extension(caller): Extension<AuthenticatedService>,
    Json(request): Json<SessionRequest>,
) -> Json<SessionInfo> {
    debug!(caller = %caller.0, "[research-aggregation] Session request");
    Json(service.start_session(request))
}

async fn aggregate(
    State(service): State<AggregationService>,
    Json(request): Json<AggregateRequest>,
) -> Result<Json<AggregateAck>, ApiError> {
    Ok(Json(service.aggregate(request)?))
}

async fn report(
    State(service): State<AggregationService>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    Ok(Json(ReportResponse {
        report: service.report(&request.session_id)?,
    }))
}

async fn list_sessions(State(service): State<AggregationService>) -> Json<SessionList> {
    Json(service.list())
}

async fn get_session(
    State(service): State<AggregationService>,
    Path(session_id): Path<String>,
) -> Result<Json<ResearchSession>, ApiError> {
    Ok(Json(service.session(&session_id)?))
}
