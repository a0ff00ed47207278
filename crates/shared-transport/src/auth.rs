//! Request authentication middleware.
//!
//! Every protected route requires `X-Service-Name`, `X-Timestamp` and
//! `X-Signature`. The signature must cover `service:timestamp:body` for the
//! exact body bytes received, and the timestamp must be within the codec's
//! skew window. Failures answer 401 and never reach the handler.

use crate::error::ApiError;
use axum::{
    body::Body,
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
};
use shared_types::{
    current_timestamp, AuthCodec, AuthError, HEADER_SERVICE_NAME, HEADER_SIGNATURE,
    HEADER_TIMESTAMP,
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Largest request body the layer will buffer for verification.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Name of the verified caller, inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedService(pub String);

struct AuthConfig {
    codec: AuthCodec,
    body_limit: usize,
}

/// Authentication layer
#[derive(Clone)]
pub struct SignatureAuthLayer {
    config: Arc<AuthConfig>,
}

impl SignatureAuthLayer {
    pub fn new(codec: AuthCodec) -> Self {
        Self {
            config: Arc::new(AuthConfig {
                codec,
                body_limit: DEFAULT_BODY_LIMIT,
            }),
        }
    }

    pub fn with_body_limit(codec: AuthCodec, body_limit: usize) -> Self {
        Self {
            config: Arc::new(AuthConfig { codec, body_limit }),
        }
    }
}

impl<S> Layer<S> for SignatureAuthLayer {
    type Service = SignatureAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SignatureAuthService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct SignatureAuthService<S> {
    inner: S,
    config: Arc<AuthConfig>,
}

impl<S> Service<Request<Body>> for SignatureAuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let bytes = match axum::body::to_bytes(body, config.body_limit).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %parts.uri.path(), error = %e, "Unreadable request body");
                    return Ok(ApiError::bad_request("Unreadable request body").into_response());
                }
            };

            match verify(&config.codec, &parts.headers, &bytes) {
                Ok(caller) => {
                    debug!(caller = %caller, path = %parts.uri.path(), "Request authenticated");
                    let mut req = Request::from_parts(parts, Body::from(bytes));
                    req.extensions_mut().insert(AuthenticatedService(caller));
                    inner.call(req).await
                }
                Err(e) => {
                    warn!(
                        security = true,
                        path = %parts.uri.path(),
                        caller = header(&parts.headers, HEADER_SERVICE_NAME).unwrap_or("<none>"),
                        error = %e,
                        "Rejected unauthenticated request"
                    );
                    Ok(unauthorized_response(&e))
                }
            }
        })
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn verify(codec: &AuthCodec, headers: &HeaderMap, body: &[u8]) -> Result<String, AuthError> {
    codec.verify_headers(
        header(headers, HEADER_SERVICE_NAME),
        header(headers, HEADER_TIMESTAMP),
        header(headers, HEADER_SIGNATURE),
        body,
        current_timestamp(),
    )
}

fn unauthorized_response(err: &AuthError) -> Response {
    let detail = match err {
        AuthError::MissingHeaders => "Missing authentication headers".to_string(),
        AuthError::InvalidTimestamp(_) => "Invalid timestamp format".to_string(),
        AuthError::StaleTimestamp { .. } => "Request timestamp too old".to_string(),
        other => other.to_string(),
    };
    ApiError::unauthorized(detail).into_response()
}
