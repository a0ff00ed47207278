//! What the orchestrator needs from the outside world: a list of services
//! and a way to make signed calls to them.

use async_trait::async_trait;
use serde_json::Value;
use shared_transport::{RawResponse, TransportError};
use shared_types::ServiceRecord;
use std::time::Duration;

/// Source of registered services.
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    async fn list_services(&self) -> Result<Vec<ServiceRecord>, TransportError>;
}

/// Issues one authenticated JSON call.
///
/// A non-2xx answer is a successful call; only failures to complete the
/// exchange are errors.
#[async_trait]
pub trait WorkflowTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}
