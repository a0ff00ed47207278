//! # Service Registry
//!
//! Directory of running services. Services register themselves, send
//! periodic heartbeats and are probed by a background health checker.
//! Discovery only hands out URLs of services currently marked healthy.
//!
//! ## Architecture
//!
//! ```text
//! adapters/api ──► service::ServiceRegistry ◄── service::HealthChecker
//!                          │                          │
//!                     ports::TimeSource          ports::HealthProbe
//! ```
//!
//! ## Status transitions
//!
//! | From | Event | To |
//! |---|---|---|
//! | any | register | unknown |
//! | any | heartbeat | healthy |
//! | any | probe ok (fresh heartbeat) | healthy |
//! | any | probe failed / timed out | unhealthy |
//! | any | no heartbeat for `heartbeat_timeout` | unhealthy |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{router, HttpHealthProbe, ManualTimeSource, SystemTimeSource};
pub use domain::{RegistryConfig, RegistryError};
pub use ports::{HealthProbe, ProbeError, TimeSource};
pub use service::{CheckOutcome, CycleReport, HealthChecker, ServiceRegistry};

use std::sync::Arc;

/// A registry with its health checker wired to the HTTP probe.
pub fn build(config: RegistryConfig) -> Result<(Arc<ServiceRegistry>, HealthChecker), ProbeError> {
    let registry = Arc::new(ServiceRegistry::with_system_clock());
    let probe = Arc::new(HttpHealthProbe::new(config.probe_timeout)?);
    let checker = HealthChecker::new(registry.clone(), probe, config);
    Ok((registry, checker))
}
