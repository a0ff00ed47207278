//! Errors raised by actors and the router.

use crate::actor::ServiceState;
use shared_types::{KindError, MessageKind, PayloadError};
use thiserror::Error;

/// Failure inside a message handler. Contained to the message that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandlerError {
    /// Payload did not decode into the handler's request type.
    #[error("Bad payload: {0}")]
    Payload(#[from] PayloadError),

    /// A referenced entity (session, ...) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Outbound body could not be encoded.
    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Handler failed: {0}")]
    Failed(String),
}

/// Why an envelope could not be dispatched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Envelope payload has no message type")]
    MissingType,

    #[error("Unknown message type: {0}")]
    UnknownType(String),

    #[error("No handler registered for {0}")]
    NoHandler(MessageKind),

    #[error("Handler for {kind} failed: {source}")]
    Handler {
        kind: MessageKind,
        #[source]
        source: HandlerError,
    },
}

impl From<KindError> for DispatchError {
    fn from(err: KindError) -> Self {
        match err {
            KindError::Missing => DispatchError::MissingType,
            KindError::Unknown(raw) => DispatchError::UnknownType(raw),
        }
    }
}

/// Delivery failures in the local router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("No actor named {0} is attached to the router")]
    UnknownRecipient(String),

    #[error("Actor {0} is not attached to a router")]
    NotAttached(String),

    #[error("Envelope {id} was rejected by {recipient}")]
    Rejected { id: String, recipient: String },

    #[error("Router closed")]
    Closed,
}

/// Illegal lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Dispatch loop can only start from Idle (currently {0:?})")]
    NotIdle(ServiceState),
}
