use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
}
