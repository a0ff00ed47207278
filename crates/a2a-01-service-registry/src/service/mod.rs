//! Registry service layer: the record directory and the health checker.

mod core;
pub mod health;

pub use self::core::ServiceRegistry;
pub use health::{CheckOutcome, CycleReport, HealthChecker};
