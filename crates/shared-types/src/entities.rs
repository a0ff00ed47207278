//! # Core Domain Entities
//!
//! Service identity and registry records shared by the registry, the
//! services that register with it and the clients that discover them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default health path probed by the registry.
pub const DEFAULT_HEALTH_ENDPOINT: &str = "/health";

/// Well-known registry port.
pub const REGISTRY_PORT: u16 = 8000;

/// Free-form string metadata attached to a registration.
pub type Metadata = BTreeMap<String, String>;

/// Registry-assigned health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Registered but not yet probed.
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::Healthy => "healthy",
            ServiceStatus::Unhealthy => "unhealthy",
        })
    }
}

/// Body of a `POST /register` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    pub service_name: String,
    pub host: String,
    pub port: u16,
    #[serde(default = "default_health_endpoint")]
    pub health_endpoint: String,
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_health_endpoint() -> String {
    DEFAULT_HEALTH_ENDPOINT.to_string()
}

impl ServiceRegistration {
    pub fn new(service_name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            service_name: service_name.into(),
            host: host.into(),
            port,
            health_endpoint: default_health_endpoint(),
            metadata: Metadata::new(),
        }
    }

    /// Base URL derived from host and port.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// What the registry knows about one service.
///
/// Keyed by `service_name`; re-registration replaces the address and
/// metadata but keeps the original `registered_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub service_name: String,
    pub host: String,
    pub port: u16,
    pub url: String,
    pub health_endpoint: String,
    pub status: ServiceStatus,
    pub registered_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ServiceRecord {
    /// Full URL probed by the health checker.
    pub fn health_url(&self) -> String {
        let base = self.url.trim_end_matches('/');
        if self.health_endpoint.starts_with('/') {
            format!("{base}{}", self.health_endpoint)
        } else {
            format!("{base}/{}", self.health_endpoint)
        }
    }
}

/// Answer to `GET /discover/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub service_name: String,
    pub url: String,
    pub status: ServiceStatus,
}

/// Acknowledgement returned by `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationAck {
    pub status: String,
    pub service_name: String,
}

/// Body of `GET /health` on every service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
}

impl HealthReport {
    pub fn healthy(service: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.into(),
        }
    }
}

// =============================================================================
// SERVICE ROLES
// =============================================================================

/// The research collaborators that make up the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceRole {
    WebSearch,
    KnowledgeExtraction,
    ResearchAggregation,
}

impl ServiceRole {
    pub const ALL: [ServiceRole; 3] = [
        ServiceRole::WebSearch,
        ServiceRole::KnowledgeExtraction,
        ServiceRole::ResearchAggregation,
    ];

    /// Name the service registers under.
    pub fn service_name(&self) -> &'static str {
        match self {
            ServiceRole::WebSearch => "web-search",
            ServiceRole::KnowledgeExtraction => "knowledge-extraction",
            ServiceRole::ResearchAggregation => "research-aggregation",
        }
    }

    /// Conventional listen port.
    pub fn default_port(&self) -> u16 {
        match self {
            ServiceRole::WebSearch => 8001,
            ServiceRole::KnowledgeExtraction => 8002,
            ServiceRole::ResearchAggregation => 8003,
        }
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

impl FromStr for ServiceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "web-search" | "search" => Ok(ServiceRole::WebSearch),
            "knowledge-extraction" | "knowledge" => Ok(ServiceRole::KnowledgeExtraction),
            "research-aggregation" | "aggregation" => Ok(ServiceRole::ResearchAggregation),
            _ => Err(format!("unknown service role: {s}")),
        }
    }
}
