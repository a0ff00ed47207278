//! Registry and collaborators on loopback ports, torn down together.

use std::sync::Arc;
use std::time::Duration;

use a2a_01_service_registry::adapters::api::REGISTRY_SERVICE_NAME;
use a2a_01_service_registry::ServiceRegistry;
use node_runtime::container::{RuntimeConfig, ServiceContainer};
use shared_transport::{RegistryClient, ServiceHost};
use shared_types::{ServiceRecord, ServiceRegistration, ServiceRole, ServiceStatus};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(100);
const READY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Cluster {
    pub config: RuntimeConfig,
    pub registry: Arc<ServiceRegistry>,
    pub registry_url: String,
    pub container: Arc<ServiceContainer>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Cluster {
    /// A registry with no services yet.
    pub async fn start() -> Self {
        let config = RuntimeConfig::default();
        let (shutdown, rx) = watch::channel(false);

        let registry = Arc::new(ServiceRegistry::with_system_clock());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let registry_url = format!("http://{}", listener.local_addr().unwrap());
        let app = a2a_01_service_registry::router(registry.clone());
        let host = ServiceHost::new(ServiceRegistration::new(REGISTRY_SERVICE_NAME, "127.0.0.1", 0));
        let task = tokio::spawn(async move {
            host.serve(listener, app, rx).await.unwrap();
        });

        let container = Arc::new(ServiceContainer::new(&config).unwrap());
        Self {
            config,
            registry,
            registry_url,
            container,
            shutdown,
            tasks: vec![task],
        }
    }

    /// Serves `role` on a free port and waits until the registry knows it.
    pub async fn serve(&mut self, role: ServiceRole) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let registry = RegistryClient::new(self.registry_url.clone()).unwrap();
        let host = ServiceHost::new(ServiceRegistration::new(role.service_name(), "127.0.0.1", port))
            .with_registry(registry, HEARTBEAT_INTERVAL);
        let app = self.container.router(role);
        let rx = self.shutdown.subscribe();
        self.tasks.push(tokio::spawn(async move {
            host.serve(listener, app, rx).await.unwrap();
        }));

        self.await_record(role.service_name(), |_| true).await;
        format!("http://127.0.0.1:{port}")
    }

    /// Waits until `name` is registered and its record satisfies `ready`.
    pub async fn await_record<F>(&self, name: &str, ready: F) -> ServiceRecord
    where
        F: Fn(&ServiceRecord) -> bool,
    {
        let deadline = tokio::time::Instant::now() + READY_TIMEOUT;
        loop {
            if let Ok(record) = self.registry.get(name) {
                if ready(&record) {
                    return record;
                }
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "{name} not ready within {READY_TIMEOUT:?}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    pub async fn await_healthy(&self, name: &str) -> ServiceRecord {
        self.await_record(name, |r| r.status == ServiceStatus::Healthy).await
    }

    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}
