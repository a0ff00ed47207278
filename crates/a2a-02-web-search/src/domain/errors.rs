use thiserror::Error;

/// Backend failure. Never surfaced to callers; the service answers with a
/// placeholder result instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    #[error("Search backend returned invalid data: {0}")]
    InvalidResponse(String),
}
