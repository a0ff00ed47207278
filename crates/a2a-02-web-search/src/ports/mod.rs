//! Ports of the search service.

pub mod outbound;

pub use outbound::SearchBackend;
