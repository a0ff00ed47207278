use shared_types::ServiceStatus;
use std::time::Duration;

/// Identity the orchestrator signs its requests with.
pub const CLIENT_NAME: &str = "research-client";

/// Which registry records discovery accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryPolicy {
    /// Every registered record, whatever its status. Registry health can lag
    /// behind a service that is up, so a bad record only surfaces when the
    /// step that needs it is called.
    #[default]
    Lenient,
    /// Only records the registry currently reports healthy.
    HealthyOnly,
}

impl DiscoveryPolicy {
    pub fn accepts(&self, status: ServiceStatus) -> bool {
        match self {
            DiscoveryPolicy::Lenient => true,
            DiscoveryPolicy::HealthyOnly => status == ServiceStatus::Healthy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub client_name: String,
    pub policy: DiscoveryPolicy,
    /// Search, extraction and report calls.
    pub long_step_timeout: Duration,
    /// Credibility, session and aggregate calls.
    pub short_step_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            client_name: CLIENT_NAME.to_string(),
            policy: DiscoveryPolicy::default(),
            long_step_timeout: Duration::from_secs(60),
            short_step_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_filter() {
        for status in [ServiceStatus::Unknown, ServiceStatus::Healthy, ServiceStatus::Unhealthy] {
            assert!(DiscoveryPolicy::Lenient.accepts(status));
        }
        assert!(DiscoveryPolicy::HealthyOnly.accepts(ServiceStatus::Healthy));
        assert!(!DiscoveryPolicy::HealthyOnly.accepts(ServiceStatus::Unknown));
        assert!(!DiscoveryPolicy::HealthyOnly.accepts(ServiceStatus::Unhealthy));
    }
}
