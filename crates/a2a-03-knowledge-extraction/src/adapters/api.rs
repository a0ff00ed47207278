//! HTTP API. Everything except `/health` requires signed headers.

use crate::service::KnowledgeService;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use shared_transport::{health_routes, SignatureAuthLayer};
use shared_types::{
    AuthCodec, CredibilityResponse, ExtractionRequest, InsightBatch, InsightStats, ServiceRole,
    TrendReport,
};

pub fn router(service: KnowledgeService, codec: AuthCodec) -> Router {
    Router::new()
        .route("/extract", post(extract))
        .route("/credibility", post(credibility))
        .route("/trends", post(trends))
        .route("/insights/stats", get(stats))
        .route_layer(SignatureAuthLayer::new(codec))
        .with_state(service)
        .merge(health_routes(ServiceRole::KnowledgeExtraction.service_name()))
}

async fn extract(
    State(service): State<KnowledgeService>,
    Json(request): Json<ExtractionRequest>,
) -> Json<InsightBatch> {
    Json(service.extract(&request.search_results))
}

async fn credibility(
    State(service): State<KnowledgeService>,
    Json(request): Json<ExtractionRequest>,
) -> Json<CredibilityResponse> {
    Json(CredibilityResponse {
        analysis: service.credibility(&request.search_results),
    })
}

async fn trends(
    State(service): State<KnowledgeService>,
    Json(request): Json<ExtractionRequest>,
) -> Json<TrendReport> {
    Json(service.trends(&request.search_results))
}

async fn stats(State(service): State<KnowledgeService>) -> Json<InsightStats> {
    Json(service.stats())
}
