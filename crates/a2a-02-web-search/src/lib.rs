//! # Web Search Service
//!
//! The `web-search` collaborator (default port 8001).
//!
//! ## Surfaces
//!
//! | Surface | Entry | Auth |
//! |---|---|---|
//! | HTTP | `GET /health` | none |
//! | HTTP | `POST /search` | signed headers |
//! | Envelope | `perform_search` | signed envelope |
//!
//! ## Module Structure
//!
//! ```text
//! adapters/api, ipc/handler ──► service::WebSearchService ──► ports::SearchBackend
//!                                                               ▲
//!                                              adapters::CatalogSearchBackend
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;

pub use adapters::{router, CatalogEntry, CatalogSearchBackend};
pub use domain::{SearchError, SearchHit};
pub use ipc::register_handlers;
pub use ports::SearchBackend;
pub use service::WebSearchService;
