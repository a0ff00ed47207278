//! Extraction rules. Everything here is synchronous and side-effect free
//! except [`InsightStore`].

pub mod credibility;
pub mod errors;
pub mod extraction;
pub mod store;
pub mod trends;

pub use credibility::{analyze_credibility, credibility_of, Credibility, TRUSTED_SOURCES};
pub use errors::KnowledgeError;
pub use extraction::InsightExtractor;
pub use store::InsightStore;
pub use trends::{identify_trends, TREND_WORDS};
