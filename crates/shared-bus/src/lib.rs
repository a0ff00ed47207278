//! # Shared Bus - Service Actors and Local Routing
//!
//! Every research service is an actor: a named identity with a handler table
//! and a FIFO inbox drained by its own dispatch loop.
//!
//! ## Rules
//!
//! - Services never call each other directly. Handlers return
//!   [`Outbound`] messages; the actor signs them and a router delivers them.
//! - Dispatch is keyed by [`MessageKind`](shared_types::MessageKind); the
//!   string `type` tag is parsed at the envelope boundary.
//! - Every envelope is verified on `receive`; unverified ones never reach a
//!   handler.
//!
//! ```text
//! ┌──────────────┐  Outbound   ┌──────────────┐   receive()   ┌──────────────┐
//! │  Service A   │ ──────────▶ │ LocalRouter  │ ────────────▶ │  Service B   │
//! │  (handler)   │   (signed)  │              │  (verified)   │   (inbox)    │
//! └──────────────┘             └──────────────┘               └──────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod actor;
pub mod errors;
pub mod handler;
pub mod router;

pub use actor::{ActorStats, ServiceActor, ServiceState, DEFAULT_POLL_INTERVAL};
pub use errors::{DispatchError, HandlerError, LifecycleError, RouteError};
pub use handler::{handler_fn, FnHandler, MessageHandler, Outbound};
pub use router::LocalRouter;
