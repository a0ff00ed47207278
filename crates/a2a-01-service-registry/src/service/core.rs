//! # Service Registry Core
//!
//! In-memory directory of [`ServiceRecord`]s keyed by service name.
//!
//! ## Invariants
//!
//! - Names are unique; registering an existing name updates its record.
//! - Status only changes through heartbeats and the health checker. There
//!   is no public way to set a status directly.
//! - Only `register` and `deregister` add or remove records.

use crate::adapters::SystemTimeSource;
use crate::domain::RegistryError;
use crate::ports::TimeSource;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shared_types::{Discovery, RegistrationAck, ServiceRecord, ServiceRegistration, ServiceStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ServiceRegistry {
    records: RwLock<HashMap<String, ServiceRecord>>,
    time: Arc<dyn TimeSource>,
}

impl ServiceRegistry {
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            time,
        }
    }

    /// Registry backed by the system clock.
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemTimeSource::new()))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    /// Inserts or replaces the record for `registration.service_name`.
    ///
    /// Status resets to `unknown` and the heartbeat clock restarts. A
    /// re-registration keeps the original `registered_at`.
    pub fn register(&self, registration: ServiceRegistration) -> RegistrationAck {
        let now = self.now();
        let url = registration.base_url();
        let name = registration.service_name.clone();

        let mut records = self.records.write();
        let registered_at = records
            .get(&name)
            .map(|existing| existing.registered_at)
            .unwrap_or(now);

        records.insert(
            name.clone(),
            ServiceRecord {
                service_name: name.clone(),
                host: registration.host,
                port: registration.port,
                url: url.clone(),
                health_endpoint: registration.health_endpoint,
                status: ServiceStatus::Unknown,
                registered_at,
                last_heartbeat: now,
                metadata: registration.metadata,
            },
        );
        drop(records);

        info!(service = %name, url = %url, "[Registry] Registered service");
        RegistrationAck {
            status: "registered".to_string(),
            service_name: name,
        }
    }

    /// Records a heartbeat: refreshes `last_heartbeat` and marks healthy.
    pub fn heartbeat(&self, name: &str) -> Result<DateTime<Utc>, RegistryError> {
        let now = self.now();
        let mut records = self.records.write();
        let record = records
            .get_mut(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        record.last_heartbeat = now;
        record.status = ServiceStatus::Healthy;
        debug!(service = %name, "[Registry] Heartbeat");
        Ok(now)
    }

    /// Every record, sorted by name.
    pub fn list(&self) -> Vec<ServiceRecord> {
        let mut all: Vec<ServiceRecord> = self.records.read().values().cloned().collect();
        all.sort_by(|a, b| a.service_name.cmp(&b.service_name));
        all
    }

    pub fn get(&self, name: &str) -> Result<ServiceRecord, RegistryError> {
        self.records
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// URL of a service, only while it is healthy.
    pub fn discover(&self, name: &str) -> Result<Discovery, RegistryError> {
        let record = self.get(name)?;
        if record.status != ServiceStatus::Healthy {
            return Err(RegistryError::ServiceUnavailable {
                name: record.service_name,
                status: record.status,
            });
        }
        Ok(Discovery {
            service_name: record.service_name,
            url: record.url,
            status: record.status,
        })
    }

    pub fn deregister(&self, name: &str) -> Result<ServiceRecord, RegistryError> {
        let removed = self
            .records
            .write()
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        info!(service = %name, "[Registry] Deregistered service");
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy used by the health checker.
    pub(crate) fn snapshot(&self) -> Vec<ServiceRecord> {
        self.records.read().values().cloned().collect()
    }

    /// Applies a health-check verdict decided from `seen`.
    ///
    /// The write only happens if the record still matches `seen`: a heartbeat
    /// or re-registration that landed while the check was running wins over
    /// the verdict. A record removed in the meantime is not recreated.
    pub(crate) fn mark(&self, seen: &ServiceRecord, status: ServiceStatus) -> Mark {
        let mut records = self.records.write();
        let Some(record) = records.get_mut(&seen.service_name) else {
            return Mark::Missing;
        };
        if record.last_heartbeat != seen.last_heartbeat
            || record.registered_at != seen.registered_at
            || record.url != seen.url
            || record.status != seen.status
        {
            return Mark::Superseded;
        }
        let previous = record.status;
        record.status = status;
        Mark::Applied(previous)
    }
}

/// What [`ServiceRegistry::mark`] did with a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mark {
    /// Written; carries the status it replaced.
    Applied(ServiceStatus),
    /// The record changed after the check started; nothing written.
    Superseded,
    /// The record is gone.
    Missing,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ManualTimeSource;
    use std::time::Duration;

    fn registry() -> (ServiceRegistry, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::starting_now());
        (ServiceRegistry::new(clock.clone()), clock)
    }

    fn registration(name: &str, port: u16) -> ServiceRegistration {
        ServiceRegistration::new(name, "127.0.0.1", port)
    }

    #[test]
    fn test_register_creates_unknown_record() {
        let (reg, clock) = registry();
        let ack = reg.register(registration("web-search", 8001));
        assert_eq!(ack.status, "registered");

        let record = reg.get("web-search").unwrap();
        assert_eq!(record.status, ServiceStatus::Unknown);
        assert_eq!(record.url, "http://127.0.0.1:8001");
        assert_eq!(record.last_heartbeat, clock.now());
    }

    #[test]
    fn test_reregister_updates_in_place() {
        let (reg, clock) = registry();
        reg.register(registration("web-search", 8001));
        let first = reg.get("web-search").unwrap();
        reg.heartbeat("web-search").unwrap();

        clock.advance(Duration::from_secs(10));
        for _ in 0..3 {
            reg.register(registration("web-search", 9001));
        }

        assert_eq!(reg.list().len(), 1);
        let record = reg.get("web-search").unwrap();
        assert_eq!(record.port, 9001);
        assert_eq!(record.status, ServiceStatus::Unknown);
        assert_eq!(record.registered_at, first.registered_at);
        assert!(record.last_heartbeat > first.last_heartbeat);
    }

    #[test]
    fn test_heartbeat() {
        let (reg, clock) = registry();
        assert_eq!(
            reg.heartbeat("ghost"),
            Err(RegistryError::NotFound("ghost".into()))
        );

        reg.register(registration("web-search", 8001));
        clock.advance(Duration::from_secs(5));
        let at = reg.heartbeat("web-search").unwrap();
        let record = reg.get("web-search").unwrap();
        assert_eq!(record.status, ServiceStatus::Healthy);
        assert_eq!(record.last_heartbeat, at);
    }

    #[test]
    fn test_discover_requires_healthy() {
        let (reg, _) = registry();
        assert!(matches!(reg.discover("ghost"), Err(RegistryError::NotFound(_))));

        reg.register(registration("web-search", 8001));
        assert_eq!(
            reg.discover("web-search"),
            Err(RegistryError::ServiceUnavailable {
                name: "web-search".into(),
                status: ServiceStatus::Unknown
            })
        );

        reg.heartbeat("web-search").unwrap();
        let found = reg.discover("web-search").unwrap();
        assert_eq!(found.url, "http://127.0.0.1:8001");

        let seen = reg.get("web-search").unwrap();
        assert_eq!(
            reg.mark(&seen, ServiceStatus::Unhealthy),
            Mark::Applied(ServiceStatus::Healthy)
        );
        assert!(matches!(
            reg.discover("web-search"),
            Err(RegistryError::ServiceUnavailable { status: ServiceStatus::Unhealthy, .. })
        ));
    }

    #[test]
    fn test_deregister() {
        let (reg, _) = registry();
        reg.register(registration("web-search", 8001));
        assert!(reg.deregister("web-search").is_ok());
        assert!(reg.is_empty());
        assert_eq!(
            reg.deregister("web-search"),
            Err(RegistryError::NotFound("web-search".into()))
        );
    }

    #[test]
    fn test_mark_does_not_resurrect() {
        let (reg, _) = registry();
        reg.register(registration("web-search", 8001));
        let seen = reg.get("web-search").unwrap();
        reg.deregister("web-search").unwrap();

        assert_eq!(reg.mark(&seen, ServiceStatus::Healthy), Mark::Missing);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_mark_skips_record_changed_since_seen() {
        let (reg, clock) = registry();
        reg.register(registration("web-search", 8001));
        let seen = reg.get("web-search").unwrap();

        clock.advance(Duration::from_secs(1));
        reg.heartbeat("web-search").unwrap();
        assert_eq!(reg.mark(&seen, ServiceStatus::Unhealthy), Mark::Superseded);
        assert_eq!(reg.get("web-search").unwrap().status, ServiceStatus::Healthy);

        // Re-registered on another port: the old verdict no longer applies.
        let seen = reg.get("web-search").unwrap();
        reg.register(registration("web-search", 9001));
        assert_eq!(reg.mark(&seen, ServiceStatus::Unhealthy), Mark::Superseded);
        assert_eq!(reg.get("web-search").unwrap().status, ServiceStatus::Unknown);
    }

    #[test]
    fn test_list_sorted() {
        let (reg, _) = registry();
        reg.register(registration("research-aggregation", 8003));
        reg.register(registration("knowledge-extraction", 8002));
        reg.register(registration("web-search", 8001));
        let names: Vec<_> = reg.list().into_iter().map(|r| r.service_name).collect();
        assert_eq!(
            names,
            vec!["knowledge-extraction", "research-aggregation", "web-search"]
        );
    }
}
