//! Sessions and report rules.

pub mod errors;
pub mod report;
pub mod session;

pub use errors::AggregationError;
pub use report::{
    average_relevance, build_report, categorize, coverage, format_duration, top_domains,
    KEY_FINDINGS, MAX_TOP_DOMAINS,
};
pub use session::ResearchSession;
