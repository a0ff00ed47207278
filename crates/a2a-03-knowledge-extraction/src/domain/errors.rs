use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}
