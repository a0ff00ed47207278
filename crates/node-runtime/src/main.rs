//! # A2A Research Node
//!
//! One binary for every role in the research system.
//!
//! ```text
//! a2a-node registry                       # service registry on :8000
//! a2a-node serve search                   # web-search on :8001
//! a2a-node serve knowledge                # knowledge-extraction on :8002
//! a2a-node serve aggregation              # research-aggregation on :8003
//! a2a-node research -q "machine learning" # one research run over HTTP
//! a2a-node demo --topic "rust"            # the whole workflow in-process
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, `A2A_*` environment, flags)
//! 2. Validate the shared secret when `--production` is set
//! 3. Run the subcommand until it finishes or Ctrl+C

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use node_runtime::container::RuntimeConfig;
use node_runtime::runtime;
use shared_types::ServiceRole;

#[derive(Parser)]
#[command(author, version, about = "Agent-to-agent research services", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Shared HMAC secret (overrides A2A_SHARED_SECRET)
    #[arg(long, global = true, env = "A2A_SHARED_SECRET", hide_env_values = true)]
    shared_secret: Option<String>,

    /// Registry base URL (overrides A2A_REGISTRY_URL)
    #[arg(long, global = true)]
    registry_url: Option<String>,

    /// Bind address
    #[arg(long, global = true)]
    host: Option<String>,

    /// Host announced to the registry
    #[arg(long, global = true)]
    advertised_host: Option<String>,

    /// Refuse to start with the development secret
    #[arg(long, global = true)]
    production: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the service registry and its health checks
    Registry {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Serve one collaborator (search, knowledge or aggregation)
    Serve {
        role: ServiceRole,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one research query against registered services
    Research {
        #[arg(short, long)]
        query: String,
        #[arg(short, long)]
        max_results: Option<usize>,
    },
    /// Run the workflow in-process over signed envelopes
    Demo {
        #[arg(short, long, default_value = "machine learning")]
        topic: String,
        #[arg(short, long)]
        max_results: Option<usize>,
    },
}

impl Cli {
    fn config(&self) -> Result<RuntimeConfig> {
        let mut config = RuntimeConfig::from_env().context("Invalid environment")?;
        if let Some(secret) = &self.shared_secret {
            config.security.shared_secret = secret.clone();
        }
        if let Some(url) = &self.registry_url {
            config.registry.url = url.clone();
        }
        if let Some(host) = &self.host {
            config.service.host = host.clone();
        }
        if let Some(host) = &self.advertised_host {
            config.service.advertised_host = Some(host.clone());
        }
        if let Command::Registry { port: Some(port) } = &self.command {
            config.registry.port = *port;
        }

        if self.production {
            config.validate_for_production()?;
        } else if config.is_dev_secret() {
            warn!("Using the development shared secret; pass --production to refuse it");
        }
        Ok(config)
    }
}

fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
        }
        tx.send_replace(true);
    });
    rx
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    match cli.command {
        Command::Registry { .. } => runtime::run_registry(&config, shutdown_signal()).await,
        Command::Serve { role, port } => {
            runtime::serve_role(&config, role, port, shutdown_signal()).await
        }
        Command::Research { query, max_results } => {
            let max = max_results.unwrap_or(config.workflow.max_results);
            let outcome = runtime::run_research(&config, &query, max).await?;
            let report = &outcome.report;
            info!(
                session = %outcome.session_id,
                sources = report.total_sources,
                insights = report.total_insights,
                high_credibility = outcome.credibility.high_credibility,
                "Research complete"
            );
            for finding in &report.key_findings {
                info!(finding = %finding, "Key finding");
            }
            println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            Ok(())
        }
        Command::Demo { topic, max_results } => {
            let max = max_results.unwrap_or(config.workflow.max_results);
            let outcome = runtime::run_demo(&config, &topic, max).await?;
            info!(
                session = %outcome.session_id,
                results = outcome.results.len(),
                insights = outcome.insights.len(),
                "Demo complete"
            );
            println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            Ok(())
        }
    }
}
