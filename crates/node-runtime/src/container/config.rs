//! # Runtime Configuration
//!
//! Unified configuration for the registry, the collaborators and the
//! research client.
//!
//! ## Sources
//!
//! Defaults, then `A2A_*` environment variables, then command-line flags
//! (applied by the binary).
//!
//! ## Security Requirements
//!
//! - The shared secret MUST NOT be [`DEV_SHARED_SECRET`] in production.

use a2a_01_service_registry::RegistryConfig;
use a2a_05_orchestrator::{DiscoveryPolicy, OrchestratorConfig};
use shared_types::{AuthCodec, DEV_SHARED_SECRET, MAX_CLOCK_SKEW_SECS, REGISTRY_PORT};
use std::time::Duration;
use thiserror::Error;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub security: SecurityConfig,
    pub registry: RegistrySettings,
    pub service: ServiceEndpointConfig,
    pub workflow: WorkflowConfig,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "SECURITY VIOLATION: shared secret is the built-in development value. \
         Set A2A_SHARED_SECRET or pass --shared-secret."
    )]
    InsecureSharedSecret,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl RuntimeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `A2A_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secret) = lookup("A2A_SHARED_SECRET") {
            config.security.shared_secret = secret;
        }
        if let Some(skew) = parse(&lookup, "A2A_MAX_CLOCK_SKEW_SECS")? {
            config.security.max_clock_skew_secs = skew;
        }

        if let Some(url) = lookup("A2A_REGISTRY_URL") {
            config.registry.url = url;
        }
        if let Some(port) = parse(&lookup, "A2A_REGISTRY_PORT")? {
            config.registry.port = port;
        }
        if let Some(secs) = parse(&lookup, "A2A_HEALTH_CHECK_SECS")? {
            config.registry.health_check_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "A2A_HEARTBEAT_TIMEOUT_SECS")? {
            config.registry.heartbeat_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "A2A_PROBE_TIMEOUT_SECS")? {
            config.registry.probe_timeout = Duration::from_secs(secs);
        }

        if let Some(host) = lookup("A2A_HOST") {
            config.service.host = host;
        }
        if let Some(host) = lookup("A2A_ADVERTISED_HOST") {
            config.service.advertised_host = Some(host);
        }
        if let Some(secs) = parse(&lookup, "A2A_HEARTBEAT_SECS")? {
            config.service.heartbeat_interval = Duration::from_secs(secs);
        }

        if let Some(policy) = lookup("A2A_DISCOVERY_POLICY") {
            config.workflow.policy = parse_policy(&policy)?;
        }
        if let Some(n) = parse(&lookup, "A2A_MAX_RESULTS")? {
            config.workflow.max_results = n;
        }

        Ok(config)
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if the shared secret is the development default.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.security.shared_secret == DEV_SHARED_SECRET {
            return Err(ConfigError::InsecureSharedSecret);
        }
        Ok(())
    }

    /// Codec for both envelope and request signing.
    pub fn codec(&self) -> AuthCodec {
        AuthCodec::new(&self.security.shared_secret).with_max_skew(self.security.max_clock_skew_secs)
    }

    pub fn is_dev_secret(&self) -> bool {
        self.security.shared_secret == DEV_SHARED_SECRET
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            health_check_interval: self.registry.health_check_interval,
            heartbeat_timeout: self.registry.heartbeat_timeout,
            probe_timeout: self.registry.probe_timeout,
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            policy: self.workflow.policy,
            long_step_timeout: self.workflow.long_step_timeout,
            short_step_timeout: self.workflow.short_step_timeout,
            ..OrchestratorConfig::default()
        }
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

/// Accepts `lenient`, `healthy-only` and `healthy_only`.
pub fn parse_policy(raw: &str) -> Result<DiscoveryPolicy, ConfigError> {
    match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "lenient" => Ok(DiscoveryPolicy::Lenient),
        "healthy-only" | "strict" => Ok(DiscoveryPolicy::HealthyOnly),
        _ => Err(ConfigError::InvalidValue {
            key: "A2A_DISCOVERY_POLICY",
            value: raw.to_string(),
        }),
    }
}

/// Message and request authentication.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Shared HMAC secret. MUST NOT be default in production.
    pub shared_secret: String,
    /// Allowed distance between a request timestamp and the local clock.
    pub max_clock_skew_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            shared_secret: DEV_SHARED_SECRET.to_string(), // MUST be overridden in production
            max_clock_skew_secs: MAX_CLOCK_SKEW_SECS,
        }
    }
}

/// Where the registry lives and how it checks services.
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    /// Base URL services and clients use to reach the registry.
    pub url: String,
    /// Port the `registry` command listens on.
    pub port: u16,
    pub health_check_interval: Duration,
    pub heartbeat_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        let checks = RegistryConfig::default();
        Self {
            url: format!("http://127.0.0.1:{REGISTRY_PORT}"),
            port: REGISTRY_PORT,
            health_check_interval: checks.health_check_interval,
            heartbeat_timeout: checks.heartbeat_timeout,
            probe_timeout: checks.probe_timeout,
        }
    }
}

/// How a collaborator binds and announces itself.
#[derive(Debug, Clone)]
pub struct ServiceEndpointConfig {
    /// Bind address.
    pub host: String,
    /// Host registered with the registry when it differs from the bind
    /// address (e.g. binding `0.0.0.0`).
    pub advertised_host: Option<String>,
    pub heartbeat_interval: Duration,
}

impl ServiceEndpointConfig {
    pub fn advertised(&self) -> &str {
        self.advertised_host.as_deref().unwrap_or(&self.host)
    }
}

impl Default for ServiceEndpointConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            advertised_host: None,
            heartbeat_interval: shared_transport::DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

/// Research client settings.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub policy: DiscoveryPolicy,
    pub max_results: usize,
    pub long_step_timeout: Duration,
    pub short_step_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let defaults = OrchestratorConfig::default();
        Self {
            policy: defaults.policy,
            max_results: 5,
            long_step_timeout: defaults.long_step_timeout,
            short_step_timeout: defaults.short_step_timeout,
        }
    }
}
