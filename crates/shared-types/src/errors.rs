//! # Error Types
//!
//! Defines error types shared by every service.

use thiserror::Error;

/// Errors raised while authenticating a request or an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// One or more of the identity / timestamp / signature headers is absent.
    #[error("Missing authentication headers")]
    MissingHeaders,

    /// Timestamp could not be parsed as integer seconds.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Timestamp differs from local time by more than the allowed skew.
    #[error("Timestamp out of range: {timestamp} not within {max_skew}s of {now}")]
    StaleTimestamp {
        timestamp: u64,
        now: u64,
        max_skew: u64,
    },

    /// Envelope carries no signature.
    #[error("Message is not signed")]
    MissingSignature,

    /// Signature is malformed or does not match.
    #[error("Invalid signature")]
    InvalidSignature,
}

/// Errors resolving the message kind of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KindError {
    /// Payload has no string `type` entry.
    #[error("Payload has no message type")]
    Missing,

    /// `type` entry names no known kind.
    #[error("Unknown message type: {0}")]
    Unknown(String),
}

/// Errors decoding a payload into a typed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Missing payload field: {0}")]
    MissingField(String),

    #[error("Invalid payload field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Malformed payload: {0}")]
    Malformed(String),
}
