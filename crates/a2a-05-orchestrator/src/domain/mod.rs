pub mod config;
pub mod errors;
pub mod workflow;

pub use config::{DiscoveryPolicy, OrchestratorConfig, CLIENT_NAME};
pub use errors::{OrchestratorError, UnavailableReason};
pub use workflow::{ResearchOutcome, Step};
