//! Driven ports of the registry.

pub mod outbound;

pub use outbound::{HealthProbe, ProbeError, TimeSource};
