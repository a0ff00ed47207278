//! # Research Orchestrator
//!
//! Client side of the system. Discovers the research collaborators through
//! the registry and runs the workflow as a sequence of signed HTTP calls.
//!
//! | Step | Service | Path | Timeout |
//! |---|---|---|---|
//! | session | research-aggregation | `/session` | short |
//! | search | web-search | `/search` | long |
//! | extract | knowledge-extraction | `/extract` | long |
//! | credibility | knowledge-extraction | `/credibility` | short |
//! | aggregate | research-aggregation | `/aggregate` | short |
//! | report | research-aggregation | `/report` | long |
//!
//! The directory and transport are ports ([`ServiceDirectory`],
//! [`WorkflowTransport`]) so the workflow runs the same against the HTTP
//! adapters and against test doubles.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{HttpTransport, RegistryDirectory};
pub use domain::{
    DiscoveryPolicy, OrchestratorConfig, OrchestratorError, ResearchOutcome, Step,
    UnavailableReason, CLIENT_NAME,
};
pub use ports::{ServiceDirectory, WorkflowTransport};
pub use service::Orchestrator;

use shared_transport::{RegistryClient, SignedClient, TransportError};
use shared_types::AuthCodec;
use std::sync::Arc;

/// Orchestrator wired to a registry at `registry_url` over HTTP.
pub fn http_orchestrator(
    registry_url: &str,
    codec: AuthCodec,
    config: OrchestratorConfig,
) -> Result<Orchestrator, TransportError> {
    let directory = RegistryDirectory::new(RegistryClient::new(registry_url)?);
    let transport = HttpTransport::new(SignedClient::new(config.client_name.clone(), codec)?);
    Ok(Orchestrator::new(Arc::new(directory), Arc::new(transport), config))
}
