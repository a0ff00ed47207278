//! Envelope handlers for the search actor.

pub mod handler;

pub use handler::{register_handlers, PerformSearchHandler, CALLBACK_FIELD, DEFAULT_SESSION};
