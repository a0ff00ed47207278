//! # Shared Transport
//!
//! HTTP plumbing used by every service and by the orchestrator:
//!
//! - [`SignatureAuthLayer`]: tower middleware verifying the `X-Service-Name`,
//!   `X-Timestamp` and `X-Signature` headers against the request body.
//! - [`SignedClient`]: reqwest client that attaches those headers.
//! - [`RegistryClient`]: typed client for the registry API.
//! - [`ServiceHost`]: serve + self-registration + heartbeat + graceful shutdown.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod auth;
pub mod client;
pub mod error;
pub mod host;
pub mod registry_client;

pub use auth::{AuthenticatedService, SignatureAuthLayer, SignatureAuthService};
pub use client::{RawResponse, SignedClient};
pub use error::{ApiError, ErrorBody, TransportError};
pub use host::{health_routes, wait_for_shutdown, ServiceHost, DEFAULT_HEARTBEAT_INTERVAL};
pub use registry_client::{RegistryClient, REGISTRY_CALL_TIMEOUT};
