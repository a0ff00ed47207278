pub mod api;
pub mod catalog;

pub use api::router;
pub use catalog::{CatalogEntry, CatalogSearchBackend};
