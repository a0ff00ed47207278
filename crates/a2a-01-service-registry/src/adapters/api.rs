//! HTTP API of the registry.
//!
//! | Method | Path | Answer |
//! |---|---|---|
//! | GET | `/health` | `{"status":"healthy","service":"registry"}` |
//! | POST | `/register` | `{"status":"registered","service_name":..}` |
//! | POST | `/heartbeat/:name` | `{"status":"heartbeat_received"}` or 404 |
//! | GET | `/services` | every record |
//! | GET | `/services/:name` | one record or 404 |
//! | DELETE | `/services/:name` | `{"status":"unregistered",..}` or 404 |
//! | GET | `/discover/:name` | `{service_name,url,status}`, 404 or 503 |

use crate::domain::RegistryError;
use crate::service::ServiceRegistry;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use shared_transport::{health_routes, ApiError};
use shared_types::{Discovery, RegistrationAck, ServiceRecord, ServiceRegistration};
use std::sync::Arc;

/// Name the registry reports on `/health`.
pub const REGISTRY_SERVICE_NAME: &str = "registry";

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) => ApiError::not_found("Service not found"),
            RegistryError::ServiceUnavailable { .. } => ApiError::unavailable("Service unhealthy"),
        }
    }
}

type AppState = Arc<ServiceRegistry>;

pub fn router(registry: Arc<ServiceRegistry>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/heartbeat/:name", post(heartbeat))
        .route("/services", get(list_services))
        .route("/services/:name", get(get_service).delete(deregister))
        .route("/discover/:name", get(discover))
        .with_state(registry)
        .merge(health_routes(REGISTRY_SERVICE_NAME))
}

async fn register(
    State(registry): State<AppState>,
    Json(registration): Json<ServiceRegistration>,
) -> Json<RegistrationAck> {
    Json(registry.register(registration))
}

async fn heartbeat(
    State(registry): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    registry.heartbeat(&name)?;
    Ok(Json(json!({ "status": "heartbeat_received" })))
}

async fn list_services(State(registry): State<AppState>) -> Json<Vec<ServiceRecord>> {
    Json(registry.list())
}

async fn get_service(
    State(registry): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ServiceRecord>, ApiError> {
    Ok(Json(registry.get(&name)?))
}

async fn deregister(
    State(registry): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let removed = registry.deregister(&name)?;
    Ok(Json(json!({
        "status": "unregistered",
        "service_name": removed.service_name,
    })))
}

async fn discover(
    State(registry): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Discovery>, ApiError> {
    Ok(Json(registry.discover(&name)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn app() -> (Router, Arc<ServiceRegistry>) {
        let registry = Arc::new(ServiceRegistry::default());
        (router(registry.clone()), registry)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy", "service": "registry"}));
    }

    #[tokio::test]
    async fn test_register_heartbeat_discover_flow() {
        let (app, _) = app();
        let registration = json!({
            "service_name": "web-search",
            "host": "localhost",
            "port": 8001,
        });

        let (status, body) = call(&app, Method::POST, "/register", Some(registration)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "registered");

        let (status, body) = call(&app, Method::GET, "/discover/web-search", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Service unhealthy");

        let (status, body) = call(&app, Method::POST, "/heartbeat/web-search", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "heartbeat_received");

        let (status, body) = call(&app, Method::GET, "/discover/web-search", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "http://localhost:8001");
        assert_eq!(body["status"], "healthy");

        let (_, body) = call(&app, Method::GET, "/services/web-search", None).await;
        assert_eq!(body["health_endpoint"], "/health");
    }

    #[tokio::test]
    async fn test_unknown_service_is_404() {
        let (app, _) = app();
        for (method, uri) in [
            (Method::POST, "/heartbeat/ghost"),
            (Method::GET, "/services/ghost"),
            (Method::DELETE, "/services/ghost"),
            (Method::GET, "/discover/ghost"),
        ] {
            let (status, body) = call(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["detail"], "Service not found");
        }
    }

    #[tokio::test]
    async fn test_list_and_deregister() {
        let (app, registry) = app();
        registry.register(ServiceRegistration::new("web-search", "localhost", 8001));
        registry.register(ServiceRegistration::new("knowledge-extraction", "localhost", 8002));

        let (_, body) = call(&app, Method::GET, "/services", None).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let (status, body) = call(&app, Method::DELETE, "/services/web-search", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "unregistered", "service_name": "web-search"}));
        assert_eq!(registry.len(), 1);
    }
}
