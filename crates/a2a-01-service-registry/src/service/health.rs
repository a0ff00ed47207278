//! # Health-Check Loop
//!
//! Every cycle, for each record:
//!
//! 1. no heartbeat within `heartbeat_timeout` → unhealthy, no probe;
//! 2. otherwise probe the health endpoint, bounded by `probe_timeout`:
//!    success → healthy, failure or timeout → unhealthy.
//!
//! Probes for different records run concurrently and each verdict is applied
//! as soon as its own check ends, so a slow service never delays another.
//! A verdict is dropped if a heartbeat or re-registration reached the record
//! after the check started. The loop never removes records.

use crate::domain::RegistryConfig;
use crate::ports::{HealthProbe, ProbeError};
use crate::service::core::Mark;
use crate::service::ServiceRegistry;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use shared_types::{ServiceRecord, ServiceStatus};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Outcome of one record's check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Probe succeeded.
    Healthy,
    /// Heartbeat older than the timeout; not probed.
    HeartbeatExpired,
    /// Probe failed or timed out.
    ProbeFailed(ProbeError),
}

impl CheckOutcome {
    pub fn status(&self) -> ServiceStatus {
        match self {
            CheckOutcome::Healthy => ServiceStatus::Healthy,
            _ => ServiceStatus::Unhealthy,
        }
    }
}

/// What one cycle decided, per service name (sorted).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub outcomes: Vec<(String, CheckOutcome)>,
}

impl CycleReport {
    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn unhealthy(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.status() == ServiceStatus::Unhealthy)
            .map(|(n, _)| n.as_str())
            .collect()
    }
}

pub struct HealthChecker {
    registry: Arc<ServiceRegistry>,
    probe: Arc<dyn HealthProbe>,
    config: RegistryConfig,
}

impl HealthChecker {
    pub fn new(
        registry: Arc<ServiceRegistry>,
        probe: Arc<dyn HealthProbe>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            registry,
            probe,
            config,
        }
    }

    /// Decides one record's verdict and applies it as soon as it is known,
    /// so a slow probe elsewhere never holds it back.
    async fn check(&self, record: ServiceRecord, now: DateTime<Utc>) -> (String, CheckOutcome) {
        let silent_for = (now - record.last_heartbeat).to_std().unwrap_or_default();
        let outcome = if silent_for > self.config.heartbeat_timeout {
            CheckOutcome::HeartbeatExpired
        } else {
            let url = record.health_url();
            match timeout(self.config.probe_timeout, self.probe.probe(&url)).await {
                Ok(Ok(())) => CheckOutcome::Healthy,
                Ok(Err(e)) => CheckOutcome::ProbeFailed(e),
                Err(_) => CheckOutcome::ProbeFailed(ProbeError::Timeout),
            }
        };

        let name = &record.service_name;
        let status = outcome.status();
        match self.registry.mark(&record, status) {
            Mark::Applied(previous) if previous != status => match &outcome {
                CheckOutcome::Healthy => info!(service = %name, "[Registry] Service healthy"),
                CheckOutcome::HeartbeatExpired => {
                    warn!(service = %name, "[Registry] Marked unhealthy (no heartbeat)")
                }
                CheckOutcome::ProbeFailed(e) => {
                    warn!(service = %name, error = %e, "[Registry] Marked unhealthy (health check failed)")
                }
            },
            Mark::Applied(_) => {}
            Mark::Superseded => {
                debug!(service = %name, verdict = %status, "[Registry] Record changed during health check, verdict dropped")
            }
            Mark::Missing => debug!(service = %name, "[Registry] Deregistered during health check"),
        }
        (record.service_name, outcome)
    }

    /// Runs one full cycle over a snapshot of the registry.
    ///
    /// The report lists every verdict, including ones dropped because the
    /// record changed while it was being checked.
    pub async fn run_cycle(&self) -> CycleReport {
        let now = self.registry.now();
        let snapshot = self.registry.snapshot();
        debug!(services = snapshot.len(), "[Registry] Health-check cycle");

        let mut outcomes = join_all(snapshot.into_iter().map(|record| self.check(record, now))).await;
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        CycleReport { outcomes }
    }

    /// Runs a cycle every `health_check_interval` until `shutdown` is set.
    /// The first cycle happens one interval after start.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let every = self.config.health_check_interval;
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?every, "[Registry] Health-check loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("[Registry] Health-check loop stopped");
    }
}
