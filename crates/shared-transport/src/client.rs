//! Signed HTTP client used for service-to-service calls.

use crate::error::TransportError;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::AuthCodec;
use std::time::Duration;
use tracing::debug;

/// Status and body of a completed call. Non-2xx is not an error here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Sends requests carrying the three auth headers for `service_name`.
#[derive(Debug, Clone)]
pub struct SignedClient {
    http: Client,
    codec: AuthCodec,
    service_name: String,
}

impl SignedClient {
    pub fn new(service_name: impl Into<String>, codec: AuthCodec) -> Result<Self, TransportError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            http,
            codec,
            service_name: service_name.into(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// POSTs `body` as JSON, signing the exact serialized bytes.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let bytes = serde_json::to_vec(body).map_err(|e| TransportError::Encode(e.to_string()))?;
        let headers = self.codec.auth_headers(&self.service_name, &bytes);

        let mut request = self
            .http
            .post(url)
            .timeout(timeout)
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }

        debug!(url = %url, bytes = bytes.len(), "POST");
        let response = request
            .body(bytes)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, url, timeout))?;
        read(response, url, timeout).await
    }

    /// Signed GET (the signature covers an empty body).
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, TransportError> {
        let headers = self.codec.auth_headers(&self.service_name, b"");
        let mut request = self.http.get(url).timeout(timeout);
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }

        debug!(url = %url, "GET");
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, url, timeout))?;
        read(response, url, timeout).await
    }
}

async fn read(
    response: reqwest::Response,
    url: &str,
    timeout: Duration,
) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::from_reqwest(e, url, timeout))?;
    Ok(RawResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedService, SignatureAuthLayer};
    use axum::{routing::post, Extension, Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn echo_app(codec: AuthCodec) -> Router {
        Router::new()
            .route(
                "/echo",
                post(
                    |Extension(caller): Extension<AuthenticatedService>, Json(body): Json<Value>| async move {
                        Json(json!({"caller": caller.0, "body": body}))
                    },
                ),
            )
            .layer(SignatureAuthLayer::new(codec))
    }

    #[tokio::test]
    async fn test_signed_post_is_accepted() {
        let codec = AuthCodec::new("client-secret");
        let base = spawn(echo_app(codec.clone())).await;
        let client = SignedClient::new("research-client", codec).unwrap();

        let resp = client
            .post_json(&format!("{base}/echo"), &json!({"query": "rust"}), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(resp.is_success());
        let body: Value = resp.json().unwrap();
        assert_eq!(body["caller"], "research-client");
        assert_eq!(body["body"]["query"], "rust");
    }

    #[tokio::test]
    async fn test_wrong_secret_returns_401_not_error() {
        let base = spawn(echo_app(AuthCodec::new("server-secret"))).await;
        let client = SignedClient::new("research-client", AuthCodec::new("client-secret")).unwrap();

        let resp = client
            .post_json(&format!("{base}/echo"), &json!({}), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(resp.status, 401);
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SignedClient::new("c", AuthCodec::new("s")).unwrap();
        let err = client
            .post_json(&format!("http://{addr}/echo"), &json!({}), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. } | TransportError::Http(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let app = Router::new().route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = spawn(app).await;
        let client = SignedClient::new("c", AuthCodec::new("s")).unwrap();
        let err = client
            .post_json(&format!("{base}/slow"), &json!({}), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
    }
}
