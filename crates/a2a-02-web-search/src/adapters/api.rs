//! HTTP API: `GET /health` (open) and `POST /search` (signed).

use crate::service::WebSearchService;
use axum::extract::State;
use axum::routing::post;
use axum::{Extension, Json, Router};
use shared_transport::{health_routes, AuthenticatedService, SignatureAuthLayer};
use shared_types::{AuthCodec, SearchRequest, SearchResponse, ServiceRole};
use tracing::info;

pub fn router(service: WebSearchService, codec: AuthCodec) -> Router {
    Router::new()
        .route("/search", post(search))
        .route_layer(SignatureAuthLayer::new(codec))
        .with_state(service)
        .merge(health_routes(ServiceRole::WebSearch.service_name()))
}

async fn search(
    State(service): State<WebSearchService>,
    Extension(caller): Extension<AuthenticatedService>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    info!(caller = %caller.0, query = %request.query_text, "[web-search] Search request");
    Json(service.search(&request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CatalogSearchBackend;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Router, AuthCodec) {
        let codec = AuthCodec::new("test-secret");
        let service = WebSearchService::new(Arc::new(CatalogSearchBackend::default()));
        (router(service, codec.clone()), codec)
    }

    fn signed(codec: &AuthCodec, body: &Value) -> Request<Body> {
        let bytes = body.to_string().into_bytes();
        let headers = codec.auth_headers("research-client", &bytes);
        let mut builder = Request::post("/search").header("content-type", "application/json");
        for (name, value) in headers.pairs() {
            builder = builder.header(name, value);
        }
        builder.body(Body::from(bytes)).unwrap()
    }

    #[tokio::test]
    async fn test_signed_search() {
        let (app, codec) = app();
        let req = signed(&codec, &json!({"query_text": "quantum computing", "max_results": 2}));
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body: SearchResponse =
            serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(body.query, "quantum computing");
        assert_eq!(body.total_results, 2);
    }

    #[tokio::test]
    async fn test_unsigned_search_rejected() {
        let (app, _) = app();
        let req = Request::post("/search")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"query_text":"x"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let (app, _) = app();
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value =
            serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(body, json!({"status": "healthy", "service": "web-search"}));
    }
}
