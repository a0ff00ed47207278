use std::time::Duration;

/// Health-check loop tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Time between health-check cycles.
    pub health_check_interval: Duration,
    /// A record with no heartbeat for longer than this is unhealthy without probing.
    pub heartbeat_timeout: Duration,
    /// Upper bound on one health probe.
    pub probe_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(30),
            heartbeat_timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(5),
        }
    }
}
