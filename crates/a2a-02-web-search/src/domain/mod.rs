//! Search domain: ranking rules, follow-up generation and de-duplication.

pub mod errors;
pub mod ranking;

pub use errors::SearchError;
pub use ranking::{
    dedup_by_url, follow_up_limit, follow_up_queries, placeholder_result, relevance_for_rank,
    SearchHit, MAX_FOLLOW_UPS,
};
