//! # Message Handlers
//!
//! A handler receives one verified envelope and returns the messages it
//! wants sent as a consequence. It never reaches into other services; the
//! owning actor signs the returned [`Outbound`] values and the router
//! delivers them.

use crate::errors::HandlerError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shared_types::{Envelope, MessageKind, Payload};
use std::future::Future;

/// An unsigned message a handler asks its actor to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipient: String,
    pub payload: Payload,
}

impl Outbound {
    /// Outbound message with a raw JSON body.
    pub fn message(recipient: impl Into<String>, kind: MessageKind, body: Value) -> Self {
        Self {
            recipient: recipient.into(),
            payload: kind.payload(body),
        }
    }

    /// Outbound message whose body is any serializable value.
    pub fn typed<T: Serialize>(
        recipient: impl Into<String>,
        kind: MessageKind,
        body: &T,
    ) -> Result<Self, HandlerError> {
        let body = serde_json::to_value(body).map_err(|e| HandlerError::Encode(e.to_string()))?;
        Ok(Self::message(recipient, kind, body))
    }

    pub fn kind(&self) -> Option<&str> {
        self.payload.get(shared_types::TYPE_KEY).and_then(Value::as_str)
    }
}

/// Processes one kind of message for an actor.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError>;
}

/// Adapts an async closure into a [`MessageHandler`].
pub struct FnHandler<F>(F);

/// Wraps `f` so it can be registered as a handler.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Outbound>, HandlerError>> + Send,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> MessageHandler for FnHandler<F>
where
    F: Fn(Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Outbound>, HandlerError>> + Send,
{
    async fn handle(&self, envelope: &Envelope) -> Result<Vec<Outbound>, HandlerError> {
        (self.0)(envelope.clone()).await
    }
}
