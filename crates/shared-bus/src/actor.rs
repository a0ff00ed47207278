//! # Service Actor
//!
//! A named service identity owning a handler table and a FIFO inbox.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──run()──▶ Running ──stop()──▶ Stopping ──(next poll boundary)──▶ Stopped
//!   └──────────────stop() before run()──────────────────────────────────▶ Stopped
//! ```
//!
//! Cancellation is cooperative: a handler already running is allowed to
//! finish and the loop notices the stop request at the next inbox poll
//! timeout.
//!
//! ## Security
//!
//! [`ServiceActor::receive`] verifies signature and freshness of every
//! envelope. Anything that fails is logged as a security event and dropped;
//! handlers only ever see verified envelopes.

use crate::errors::{DispatchError, LifecycleError, RouteError};
use crate::handler::{MessageHandler, Outbound};
use parking_lot::RwLock;
use shared_types::{current_timestamp, AuthCodec, Envelope, MessageKind, Payload};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// How long the dispatch loop waits on an empty inbox before re-checking
/// for a stop request.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Dispatch loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Counters exposed for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorStats {
    /// Envelopes that passed verification and were queued.
    pub accepted: u64,
    /// Envelopes dropped at `receive`.
    pub rejected: u64,
    /// Envelopes whose handler completed successfully.
    pub handled: u64,
    /// Envelopes that failed dispatch (no handler or handler error).
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    handled: AtomicU64,
    failed: AtomicU64,
}

/// One service in the actor model.
pub struct ServiceActor {
    name: String,
    codec: AuthCodec,
    handlers: RwLock<HashMap<MessageKind, Arc<dyn MessageHandler>>>,
    inbox_tx: mpsc::UnboundedSender<Envelope>,
    inbox_rx: Mutex<mpsc::UnboundedReceiver<Envelope>>,
    pending: AtomicUsize,
    state: RwLock<ServiceState>,
    stop_tx: watch::Sender<bool>,
    outbox: RwLock<Option<mpsc::UnboundedSender<Envelope>>>,
    poll_interval: Duration,
    counters: Counters,
}

impl ServiceActor {
    pub fn new(name: impl Into<String>, codec: AuthCodec) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (stop_tx, _) = watch::channel(false);
        Self {
            name: name.into(),
            codec,
            handlers: RwLock::new(HashMap::new()),
            inbox_tx,
            inbox_rx: Mutex::new(inbox_rx),
            pending: AtomicUsize::new(0),
            state: RwLock::new(ServiceState::Idle),
            stop_tx,
            outbox: RwLock::new(None),
            poll_interval: DEFAULT_POLL_INTERVAL,
            counters: Counters::default(),
        }
    }

    /// Creates an actor wrapped in `Arc` for sharing with its loop task.
    pub fn new_shared(name: impl Into<String>, codec: AuthCodec) -> Arc<Self> {
        Arc::new(Self::new(name, codec))
    }

    /// Overrides the inbox poll interval (the stop-latency bound).
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }

    /// Verified envelopes waiting in the inbox.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> ActorStats {
        ActorStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            handled: self.counters.handled.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    // =========================================================================
    // HANDLER TABLE
    // =========================================================================

    /// Registers `handler` for `kind`, replacing any previous one.
    pub fn register_handler(&self, kind: MessageKind, handler: impl MessageHandler + 'static) {
        self.register_shared_handler(kind, Arc::new(handler));
    }

    pub fn register_shared_handler(&self, kind: MessageKind, handler: Arc<dyn MessageHandler>) {
        if self.handlers.write().insert(kind, handler).is_some() {
            debug!(service = %self.name, message_type = %kind, "Replaced handler");
        }
    }

    pub fn handles(&self, kind: MessageKind) -> bool {
        self.handlers.read().contains_key(&kind)
    }

    // =========================================================================
    // SENDING
    // =========================================================================

    /// Builds a signed envelope from this actor to `recipient`.
    pub fn create_message(&self, recipient: impl Into<String>, payload: Payload) -> Envelope {
        let mut envelope = Envelope::new(self.name.clone(), recipient, payload, current_timestamp());
        self.codec.seal(&mut envelope);
        envelope
    }

    /// Signs `payload` and hands it straight to `target`.
    pub fn send(&self, target: &ServiceActor, payload: Payload) -> Envelope {
        let envelope = self.create_message(target.name(), payload);
        target.receive(envelope.clone());
        envelope
    }

    /// Signs `payload` and pushes it to the attached router for delivery to
    /// the service named `recipient`.
    pub fn emit(&self, recipient: impl Into<String>, payload: Payload) -> Result<Envelope, RouteError> {
        let envelope = self.create_message(recipient, payload);
        self.forward(envelope.clone())?;
        Ok(envelope)
    }

    pub(crate) fn attach_outbox(&self, outbox: mpsc::UnboundedSender<Envelope>) {
        *self.outbox.write() = Some(outbox);
    }

    fn forward(&self, envelope: Envelope) -> Result<(), RouteError> {
        let outbox = self.outbox.read();
        let Some(tx) = outbox.as_ref() else {
            return Err(RouteError::NotAttached(self.name.clone()));
        };
        tx.send(envelope).map_err(|_| RouteError::Closed)
    }

    // =========================================================================
    // RECEIVING
    // =========================================================================

    /// Verifies and enqueues an envelope.
    ///
    /// Returns whether the envelope was accepted. Rejections never surface to
    /// the sender; they are only logged.
    pub fn receive(&self, envelope: Envelope) -> bool {
        if envelope.recipient != self.name {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(
                security = true,
                service = %self.name,
                recipient = %envelope.recipient,
                message_id = %envelope.id,
                "Dropping misaddressed envelope"
            );
            return false;
        }

        if let Err(e) = self.codec.verify_envelope(&envelope, current_timestamp()) {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(
                security = true,
                service = %self.name,
                sender = %envelope.sender,
                message_id = %envelope.id,
                error = %e,
                "Dropping unverified envelope"
            );
            return false;
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.inbox_tx.send(envelope).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        self.counters.accepted.fetch_add(1, Ordering::Relaxed);
        true
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Runs the handler for one envelope and returns the signed envelopes
    /// it produced. Does not forward them.
    pub async fn dispatch_one(&self, envelope: &Envelope) -> Result<Vec<Envelope>, DispatchError> {
        let kind = envelope.kind()?;
        let handler = self
            .handlers
            .read()
            .get(&kind)
            .cloned()
            .ok_or(DispatchError::NoHandler(kind))?;

        let outbound = handler
            .handle(envelope)
            .await
            .map_err(|source| DispatchError::Handler { kind, source })?;

        Ok(outbound
            .into_iter()
            .map(|Outbound { recipient, payload }| self.create_message(recipient, payload))
            .collect())
    }

    async fn process(&self, envelope: Envelope) {
        match self.dispatch_one(&envelope).await {
            Ok(replies) => {
                self.counters.handled.fetch_add(1, Ordering::Relaxed);
                for reply in replies {
                    let (id, recipient) = (reply.id.clone(), reply.recipient.clone());
                    if let Err(e) = self.forward(reply) {
                        warn!(service = %self.name, message_id = %id, recipient = %recipient, error = %e, "Outbound envelope not delivered");
                    }
                }
            }
            Err(e @ DispatchError::Handler { .. }) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(service = %self.name, message_id = %envelope.id, error = %e, "Handler failed");
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(service = %self.name, message_id = %envelope.id, error = %e, "Unhandled message");
            }
        }
    }

    /// Drains the inbox in FIFO order until [`ServiceActor::stop`] is called.
    pub async fn run(&self) -> Result<(), LifecycleError> {
        {
            let mut state = self.state.write();
            if *state != ServiceState::Idle {
                return Err(LifecycleError::NotIdle(*state));
            }
            *state = ServiceState::Running;
        }

        let stop = self.stop_tx.subscribe();
        let mut inbox = self.inbox_rx.lock().await;
        info!(service = %self.name, "Dispatch loop started");

        while !*stop.borrow() {
            match timeout(self.poll_interval, inbox.recv()).await {
                Err(_) => continue,
                Ok(None) => break,
                Ok(Some(envelope)) => {
                    self.pending.fetch_sub(1, Ordering::AcqRel);
                    self.process(envelope).await;
                }
            }
        }

        *self.state.write() = ServiceState::Stopped;
        info!(service = %self.name, "Dispatch loop stopped");
        Ok(())
    }

    /// Requests the dispatch loop to stop.
    pub fn stop(&self) {
        {
            let mut state = self.state.write();
            *state = match *state {
                ServiceState::Idle => ServiceState::Stopped,
                ServiceState::Running => ServiceState::Stopping,
                other => other,
            };
        }
        self.stop_tx.send_replace(true);
    }
}

impl std::fmt::Debug for ServiceActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceActor")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish()
    }
}
