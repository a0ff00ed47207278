//! # Research Aggregation Service
//!
//! The `research-aggregation` collaborator (default port 8003). Owns research
//! sessions: results and insights accumulate per session until a report is
//! generated from a snapshot.
//!
//! | Surface | Entry |
//! |---|---|
//! | HTTP | `GET /health`, `POST /session`, `POST /aggregate`, `POST /report`, `GET /sessions`, `GET /sessions/:id` |
//! | Envelope | `start_web_research_session`, `aggregate_web_results`, `generate_web_report` → `web_report_ready` |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod service;

pub use adapters::router;
pub use domain::{AggregationError, ResearchSession};
pub use ipc::register_handlers;
pub use service::AggregationService;
