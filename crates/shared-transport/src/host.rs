//! Service host: serves an axum app, registers it with the registry and
//! keeps it alive with heartbeats until shutdown.

use crate::error::TransportError;
use crate::registry_client::RegistryClient;
use axum::{routing::get, Json, Router};
use shared_types::{HealthReport, ServiceRegistration};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Default interval between heartbeats.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

const MAX_REQUEST_BODY: usize = 4 * 1024 * 1024;

/// Unauthenticated `GET /health` route answering `{status, service}`.
pub fn health_routes(service_name: &str) -> Router {
    let report = HealthReport::healthy(service_name);
    Router::new().route(
        "/health",
        get(move || {
            let report = report.clone();
            async move { Json(report) }
        }),
    )
}

/// Resolves once `shutdown` holds `true` (or its sender is gone).
pub async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

pub struct ServiceHost {
    registration: ServiceRegistration,
    registry: Option<RegistryClient>,
    heartbeat_interval: Duration,
}

impl ServiceHost {
    pub fn new(registration: ServiceRegistration) -> Self {
        Self {
            registration,
            registry: None,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Registers with `registry` on start and heartbeats every `interval`.
    pub fn with_registry(mut self, registry: RegistryClient, interval: Duration) -> Self {
        self.registry = Some(registry);
        self.heartbeat_interval = interval;
        self
    }

    pub fn registration(&self) -> &ServiceRegistration {
        &self.registration
    }

    /// Serves `app` on `listener` until `shutdown` fires.
    ///
    /// A port of 0 in the registration is replaced by the bound port.
    /// Registry failures are logged and never stop the server.
    pub async fn serve(
        mut self,
        listener: TcpListener,
        app: Router,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), TransportError> {
        let local: SocketAddr = listener.local_addr()?;
        if self.registration.port == 0 {
            self.registration.port = local.port();
        }
        let name = self.registration.service_name.clone();

        let heartbeat = match &self.registry {
            Some(registry) => {
                register(registry, &self.registration).await;
                Some(spawn_heartbeat(
                    registry.clone(),
                    self.registration.clone(),
                    self.heartbeat_interval,
                    shutdown.clone(),
                ))
            }
            None => None,
        };

        let app = app
            .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY))
            .layer(TraceLayer::new_for_http());

        info!(service = %name, addr = %local, "Service listening");
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await;

        if let Some(task) = heartbeat {
            task.abort();
        }
        if let Some(registry) = &self.registry {
            if let Err(e) = registry.deregister(&name).await {
                warn!(service = %name, error = %e, "Deregistration failed");
            }
        }

        info!(service = %name, "Service stopped");
        served.map_err(TransportError::from)
    }
}

async fn register(registry: &RegistryClient, registration: &ServiceRegistration) {
    match registry.register(registration).await {
        Ok(_) => info!(
            service = %registration.service_name,
            registry = %registry.base_url(),
            "Registered with service registry"
        ),
        Err(e) => warn!(
            service = %registration.service_name,
            error = %e,
            "Failed to register with service registry"
        ),
    }
}

fn spawn_heartbeat(
    registry: RegistryClient,
    registration: ServiceRegistration,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            match registry.heartbeat(&registration.service_name).await {
                Ok(()) => {}
                Err(TransportError::NotFound(_)) => {
                    // Registry restarted and forgot us.
                    warn!(service = %registration.service_name, "Unknown to registry, re-registering");
                    register(&registry, &registration).await;
                }
                Err(e) => error!(service = %registration.service_name, error = %e, "Heartbeat failed"),
            }
        }
    })
}
