//! Outbound dependencies of the registry: a clock and a health probe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Abstract interface for getting the current time.
///
/// Lets tests move time forward instead of sleeping through heartbeat
/// timeouts. Production uses the system clock.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Why a health probe failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("Health endpoint answered {0}")]
    Status(u16),

    #[error("Health endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("Health probe timed out")]
    Timeout,
}

/// Active health check against a service's health endpoint.
///
/// Implementations need not enforce a timeout; the health checker bounds
/// every probe itself.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, health_url: &str) -> Result<(), ProbeError>;
}
