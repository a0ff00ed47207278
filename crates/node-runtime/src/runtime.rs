//! # Node Commands
//!
//! What each `a2a-node` subcommand runs. Every long-running command takes
//! a shutdown receiver and returns once it flips to `true`.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use a2a_05_orchestrator::{http_orchestrator, ResearchOutcome};
use shared_transport::{RegistryClient, ServiceHost};
use shared_types::{ServiceRegistration, ServiceRole};

use crate::container::{RuntimeConfig, ServiceContainer};
use crate::wiring::{ChoreographyOutcome, ResearchChoreography};

/// Name the registry reports on `/health`.
pub const REGISTRY_NAME: &str = a2a_01_service_registry::adapters::api::REGISTRY_SERVICE_NAME;

/// Runs the registry API and its health-check loop.
pub async fn run_registry(config: &RuntimeConfig, shutdown: watch::Receiver<bool>) -> Result<()> {
    let (registry, checker) = a2a_01_service_registry::build(config.registry_config())
        .context("Failed to build health probe")?;

    let addr = format!("{}:{}", config.service.host, config.registry.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind registry on {addr}"))?;

    let checks = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { checker.run(shutdown).await })
    };

    info!(
        addr = %addr,
        interval = ?config.registry.health_check_interval,
        heartbeat_timeout = ?config.registry.heartbeat_timeout,
        "Service registry starting"
    );
    let host = ServiceHost::new(ServiceRegistration::new(
        REGISTRY_NAME,
        config.service.advertised(),
        config.registry.port,
    ));
    let served = host
        .serve(listener, a2a_01_service_registry::router(registry), shutdown)
        .await;

    checks.abort();
    served.context("Registry server failed")
}

/// Serves one collaborator over HTTP, registered with the registry.
pub async fn serve_role(
    config: &RuntimeConfig,
    role: ServiceRole,
    port: Option<u16>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let container = ServiceContainer::new(config).context("Failed to build services")?;
    let port = port.unwrap_or_else(|| role.default_port());

    let addr = format!("{}:{}", config.service.host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {role} on {addr}"))?;

    let registry = RegistryClient::new(config.registry.url.clone())
        .context("Failed to build registry client")?;
    let mut registration = ServiceRegistration::new(role.service_name(), config.service.advertised(), port);
    registration
        .metadata
        .insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    info!(service = %role, addr = %addr, registry = %config.registry.url, "Service starting");
    ServiceHost::new(registration)
        .with_registry(registry, config.service.heartbeat_interval)
        .serve(listener, container.router(role), shutdown)
        .await
        .with_context(|| format!("{role} server failed"))
}

/// One research run through the registry and the HTTP services.
pub async fn run_research(config: &RuntimeConfig, query: &str, max_results: usize) -> Result<ResearchOutcome> {
    let orchestrator = http_orchestrator(
        &config.registry.url,
        config.codec(),
        config.orchestrator_config(),
    )
    .context("Failed to build research client")?;

    let outcome = orchestrator
        .run_research(query, max_results)
        .await
        .with_context(|| format!("Research for {query:?} failed"))?;

    for (name, url) in orchestrator.discovered() {
        info!(service = %name, url = %url, "Discovered");
    }
    Ok(outcome)
}

/// The whole workflow in one process, over signed envelopes.
pub async fn run_demo(config: &RuntimeConfig, topic: &str, max_results: usize) -> Result<ChoreographyOutcome> {
    if config.is_dev_secret() {
        warn!("Using the development shared secret");
    }
    let container = ServiceContainer::new(config).context("Failed to build services")?;
    let choreography = ResearchChoreography::new(
        &container,
        Duration::from_millis(200),
        config.workflow.long_step_timeout,
    );
    choreography
        .run(topic, max_results)
        .await
        .context("In-process research failed")
}
