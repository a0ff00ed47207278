//! HTTP client for the service registry API.

use crate::error::{ErrorBody, TransportError};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use shared_types::{Discovery, RegistrationAck, ServiceRecord, ServiceRegistration};
use std::time::Duration;
use tracing::debug;

/// Default per-call timeout for registry calls.
pub const REGISTRY_CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(REGISTRY_CALL_TIMEOUT)
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: REGISTRY_CALL_TIMEOUT,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/{route}/{name}` with `name` percent-encoded as one path
    /// segment, so `/`, `?` and `#` in a name never change the route.
    fn named_url(&self, route: &str, name: &str) -> Result<String, TransportError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TransportError::Http(format!("invalid registry url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::Http(format!("registry url {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(route)
            .push(name);
        Ok(url.into())
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<Response, TransportError> {
        request
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, url, self.timeout))
    }

    /// Turns a response into `T`, mapping 404 and 503 onto typed errors.
    async fn decode<T: DeserializeOwned>(
        response: Response,
        name: &str,
    ) -> Result<T, TransportError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        match status {
            s if s.is_success() => {
                serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
            }
            StatusCode::NOT_FOUND => Err(TransportError::NotFound(name.to_string())),
            StatusCode::SERVICE_UNAVAILABLE => Err(TransportError::Unavailable {
                name: name.to_string(),
                detail: serde_json::from_str::<ErrorBody>(&body)
                    .map(|e| e.detail)
                    .unwrap_or(body),
            }),
            other => Err(TransportError::Status {
                status: other.as_u16(),
                body,
            }),
        }
    }

    /// `GET /health` on the registry itself.
    pub async fn health(&self) -> bool {
        let url = self.url("/health");
        match self.send(self.http.get(&url), &url).await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    pub async fn register(
        &self,
        registration: &ServiceRegistration,
    ) -> Result<RegistrationAck, TransportError> {
        let url = self.url("/register");
        debug!(service = %registration.service_name, registry = %self.base_url, "Registering");
        let resp = self.send(self.http.post(&url).json(registration), &url).await?;
        Self::decode(resp, &registration.service_name).await
    }

    pub async fn heartbeat(&self, name: &str) -> Result<(), TransportError> {
        let url = self.named_url("heartbeat", name)?;
        let resp = self.send(self.http.post(&url), &url).await?;
        Self::decode::<serde_json::Value>(resp, name).await.map(|_| ())
    }

    pub async fn list(&self) -> Result<Vec<ServiceRecord>, TransportError> {
        let url = self.url("/services");
        let resp = self.send(self.http.get(&url), &url).await?;
        Self::decode(resp, "*").await
    }

    pub async fn get(&self, name: &str) -> Result<ServiceRecord, TransportError> {
        let url = self.named_url("services", name)?;
        let resp = self.send(self.http.get(&url), &url).await?;
        Self::decode(resp, name).await
    }

    pub async fn discover(&self, name: &str) -> Result<Discovery, TransportError> {
        let url = self.named_url("discover", name)?;
        let resp = self.send(self.http.get(&url), &url).await?;
        Self::decode(resp, name).await
    }

    pub async fn deregister(&self, name: &str) -> Result<(), TransportError> {
        let url = self.named_url("services", name)?;
        let resp = self.send(self.http.delete(&url), &url).await?;
        Self::decode::<serde_json::Value>(resp, name).await.map(|_| ())
    }
}
