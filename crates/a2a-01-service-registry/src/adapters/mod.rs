//! Registry adapters: clocks, the HTTP health probe and the HTTP API.

pub mod api;
pub mod probe;
pub mod time;

pub use api::{router, REGISTRY_SERVICE_NAME};
pub use probe::HttpHealthProbe;
pub use time::{ManualTimeSource, SystemTimeSource};
