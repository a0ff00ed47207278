//! # Local Router
//!
//! Delivers envelopes between actors living in the same process.
//!
//! Each attached actor gets the router's outbox; envelopes its handlers
//! return (and anything it [`emit`](ServiceActor::emit)s) land there and are
//! handed to the addressed actor's `receive`, which verifies them again.

use crate::actor::ServiceActor;
use crate::errors::RouteError;
use parking_lot::RwLock;
use shared_types::Envelope;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

pub struct LocalRouter {
    actors: RwLock<HashMap<String, Arc<ServiceActor>>>,
    outbox_tx: mpsc::UnboundedSender<Envelope>,
    outbox_rx: Mutex<mpsc::UnboundedReceiver<Envelope>>,
    delivered: AtomicU64,
    undeliverable: AtomicU64,
}

impl LocalRouter {
    pub fn new() -> Self {
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        Self {
            actors: RwLock::new(HashMap::new()),
            outbox_tx,
            outbox_rx: Mutex::new(outbox_rx),
            delivered: AtomicU64::new(0),
            undeliverable: AtomicU64::new(0),
        }
    }

    /// Makes `actor` addressable by name and wires its outbox to this router.
    pub fn attach(&self, actor: Arc<ServiceActor>) {
        actor.attach_outbox(self.outbox_tx.clone());
        let name = actor.name().to_string();
        debug!(service = %name, "Actor attached to router");
        self.actors.write().insert(name, actor);
    }

    pub fn actor(&self, name: &str) -> Option<Arc<ServiceActor>> {
        self.actors.read().get(name).cloned()
    }

    /// Names of attached actors, sorted.
    pub fn actor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actors.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Hands one envelope to its recipient immediately.
    pub fn deliver(&self, envelope: Envelope) -> Result<(), RouteError> {
        let Some(actor) = self.actor(&envelope.recipient) else {
            self.undeliverable.fetch_add(1, Ordering::Relaxed);
            return Err(RouteError::UnknownRecipient(envelope.recipient));
        };

        let (id, recipient) = (envelope.id.clone(), envelope.recipient.clone());
        if actor.receive(envelope) {
            self.delivered.fetch_add(1, Ordering::Relaxed);
            Ok(())
        } else {
            self.undeliverable.fetch_add(1, Ordering::Relaxed);
            Err(RouteError::Rejected { id, recipient })
        }
    }

    /// Queues an envelope for delivery by [`LocalRouter::run`].
    pub fn submit(&self, envelope: Envelope) -> Result<(), RouteError> {
        self.outbox_tx.send(envelope).map_err(|_| RouteError::Closed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn undeliverable(&self) -> u64 {
        self.undeliverable.load(Ordering::Relaxed)
    }

    /// Forwards queued envelopes until `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut outbox = self.outbox_rx.lock().await;
        info!(actors = ?self.actor_names(), "Local router started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                next = outbox.recv() => {
                    let Some(envelope) = next else { break };
                    let (id, sender) = (envelope.id.clone(), envelope.sender.clone());
                    if let Err(e) = self.deliver(envelope) {
                        warn!(message_id = %id, sender = %sender, error = %e, "Envelope not delivered");
                    }
                }
            }
        }

        info!("Local router stopped");
    }
}

impl Default for LocalRouter {
    fn default() -> Self {
        Self::new()
    }
}
