use shared_types::ServiceStatus;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Service not found: {0}")]
    NotFound(String),

    /// Known but not currently healthy.
    #[error("Service {name} unavailable (status: {status})")]
    ServiceUnavailable { name: String, status: ServiceStatus },
}
