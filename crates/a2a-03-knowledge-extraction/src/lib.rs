//! # Knowledge Extraction Service
//!
//! The `knowledge-extraction` collaborator (default port 8002). Turns search
//! results into typed insights, scores source credibility and spots trend
//! vocabulary.
//!
//! | Surface | Entry |
//! |---|---|
//! | HTTP | `GET /health`, `POST /extract`, `POST /credibility`, `POST /trends`, `GET /insights/stats` |
//! | Envelope | `extract_web_insights`, `analyze_source_credibility`, `identify_research_trends` |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod service;

pub use adapters::router;
pub use domain::{Credibility, InsightExtractor, InsightStore, KnowledgeError};
pub use ipc::register_handlers;
pub use service::KnowledgeService;
