use crate::domain::Step;
use std::fmt;
use thiserror::Error;

/// Why a service a step needs could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Not in the discovered set. No request was sent.
    NeverDiscovered,
    /// Discovered, but the call did not complete.
    CallFailed(String),
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::NeverDiscovered => f.write_str("never discovered"),
            UnavailableReason::CallFailed(reason) => write!(f, "call failed: {reason}"),
        }
    }
}

/// Workflow failures. Any of them aborts the current run; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("Service discovery failed: {0}")]
    Discovery(String),

    #[error("Service {service} unavailable: {reason}")]
    ServiceUnavailable {
        service: String,
        reason: UnavailableReason,
    },

    #[error("Step {step} failed with status {status}: {body}")]
    StepFailed { step: Step, status: u16, body: String },

    #[error("Step {step} returned an unreadable body: {reason}")]
    Decode { step: Step, reason: String },
}

impl OrchestratorError {
    pub fn never_discovered(service: impl Into<String>) -> Self {
        OrchestratorError::ServiceUnavailable {
            service: service.into(),
            reason: UnavailableReason::NeverDiscovered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            OrchestratorError::never_discovered("web-search").to_string(),
            "Service web-search unavailable: never discovered"
        );
        let err = OrchestratorError::StepFailed {
            step: Step::GenerateReport,
            status: 404,
            body: "{\"detail\":\"Session not found\"}".into(),
        };
        assert!(err.to_string().starts_with("Step report failed with status 404"));
    }
}
