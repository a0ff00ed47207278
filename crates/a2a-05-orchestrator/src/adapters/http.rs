//! HTTP implementations of the orchestrator ports.

use crate::ports::{ServiceDirectory, WorkflowTransport};
use async_trait::async_trait;
use serde_json::Value;
use shared_transport::{RawResponse, RegistryClient, SignedClient, TransportError};
use shared_types::ServiceRecord;
use std::time::Duration;

/// Lists services through the registry's `GET /services`.
pub struct RegistryDirectory {
    client: RegistryClient,
}

impl RegistryDirectory {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceDirectory for RegistryDirectory {
    async fn list_services(&self) -> Result<Vec<ServiceRecord>, TransportError> {
        self.client.list().await
    }
}

/// Signed reqwest calls.
pub struct HttpTransport {
    client: SignedClient,
}

impl HttpTransport {
    pub fn new(client: SignedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkflowTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        self.client.post_json(url, body, timeout).await
    }
}
