//! # Registry Health Tests
//!
//! Heartbeats from live services and HTTP health probes against live and
//! stalled endpoints. A stalled endpoint must cost at most one probe
//! timeout and never change another service's verdict.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use a2a_01_service_registry::{
        CheckOutcome, HealthChecker, HttpHealthProbe, ProbeError, RegistryConfig,
    };
    use axum::routing::get;
    use axum::Router;
    use shared_transport::{RegistryClient, TransportError};
    use shared_types::{ServiceRegistration, ServiceRole, ServiceStatus};
    use tokio::net::TcpListener;

    use crate::integration::harness::Cluster;

    const PROBE_TIMEOUT: Duration = Duration::from_millis(300);

    /// A service whose `/health` answers only after `delay`.
    async fn spawn_stalled(delay: Duration) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let app = Router::new().route(
            "/health",
            get(move || async move {
                tokio::time::sleep(delay).await;
                "late"
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        port
    }

    fn checker(cluster: &Cluster) -> HealthChecker {
        let config = RegistryConfig {
            probe_timeout: PROBE_TIMEOUT,
            ..RegistryConfig::default()
        };
        let probe = Arc::new(HttpHealthProbe::new(config.probe_timeout).unwrap());
        HealthChecker::new(cluster.registry.clone(), probe, config)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_heartbeat_marks_service_healthy() {
        let mut cluster = Cluster::start().await;
        cluster.serve(ServiceRole::WebSearch).await;

        let record = cluster.await_healthy(ServiceRole::WebSearch.service_name()).await;
        assert!(record.last_heartbeat >= record.registered_at);

        cluster.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_probe_timeout_is_isolated() {
        let mut cluster = Cluster::start().await;
        let search = ServiceRole::WebSearch.service_name();
        cluster.serve(ServiceRole::WebSearch).await;

        let stalled_port = spawn_stalled(Duration::from_secs(3)).await;
        cluster
            .registry
            .register(ServiceRegistration::new("stalled", "127.0.0.1", stalled_port));
        cluster.registry.heartbeat("stalled").unwrap();

        let started = Instant::now();
        let report = checker(&cluster).run_cycle().await;
        let elapsed = started.elapsed();

        assert_eq!(report.outcome(search), Some(&CheckOutcome::Healthy));
        assert_eq!(
            report.outcome("stalled"),
            Some(&CheckOutcome::ProbeFailed(ProbeError::Timeout))
        );
        assert_eq!(report.unhealthy(), vec!["stalled"]);
        assert!(elapsed < Duration::from_secs(2), "cycle took {elapsed:?}");

        assert_eq!(cluster.registry.get("stalled").unwrap().status, ServiceStatus::Unhealthy);
        assert_eq!(cluster.registry.get(search).unwrap().status, ServiceStatus::Healthy);

        cluster.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unreachable_service_marked_unhealthy() {
        let cluster = Cluster::start().await;
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed = listener.local_addr().unwrap().port();
        drop(listener);
        cluster
            .registry
            .register(ServiceRegistration::new("gone", "127.0.0.1", closed));
        cluster.registry.heartbeat("gone").unwrap();

        let report = checker(&cluster).run_cycle().await;
        assert!(matches!(
            report.outcome("gone"),
            Some(CheckOutcome::ProbeFailed(ProbeError::Unreachable(_)))
        ));
        // Unhealthy records stay listed.
        assert_eq!(cluster.registry.get("gone").unwrap().status, ServiceStatus::Unhealthy);

        cluster.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reserved_characters_in_service_name() {
        let cluster = Cluster::start().await;
        let client = RegistryClient::new(cluster.registry_url.clone()).unwrap();
        let name = "lab/search?v=2#x";

        client
            .register(&ServiceRegistration::new(name, "127.0.0.1", 9100))
            .await
            .unwrap();
        client.heartbeat(name).await.unwrap();

        let record = client.get(name).await.unwrap();
        assert_eq!(record.service_name, name);
        assert_eq!(record.status, ServiceStatus::Healthy);
        assert_eq!(client.discover(name).await.unwrap().url, "http://127.0.0.1:9100");

        client.deregister(name).await.unwrap();
        assert!(matches!(client.get(name).await, Err(TransportError::NotFound(_))));
        assert!(cluster.registry.is_empty());

        cluster.shutdown().await;
    }
}
