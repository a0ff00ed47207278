//! # Shared Types Crate
//!
//! This crate contains the signed [`Envelope`], the [`AuthCodec`] used to sign
//! and verify both envelopes and HTTP requests, and every entity and payload
//! exchanged between the registry, the research services and the orchestrator.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-service types are defined here.
//! - **Envelope Integrity**: an envelope's signature covers every addressed
//!   field; mutation after signing is detectable.
//! - **Typed Dispatch**: message kinds are a closed enum; the string form is a
//!   wire detail.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ipc;
pub mod security;

pub use entities::*;
pub use envelope::{Envelope, MessageKind, Payload, TYPE_KEY};
pub use errors::*;
pub use ipc::*;
pub use security::*;
