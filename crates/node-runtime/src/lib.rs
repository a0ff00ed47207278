//! # Node Runtime Library
//!
//! Everything the `a2a-node` binary runs, exposed for tests.
//!
//! - `container/` - configuration and construction of the collaborators
//! - `wiring/` - in-process choreography over the local router
//! - `runtime` - one entry point per subcommand

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod container;
pub mod runtime;
pub mod wiring;

pub use container::{ConfigError, RuntimeConfig, ServiceContainer};
pub use wiring::{ChoreographyOutcome, ResearchChoreography};
