//! # Service Container
//!
//! Configuration plus construction of every research collaborator, both
//! as an HTTP app and as an in-process actor.

pub mod config;
pub mod services;

pub use config::{ConfigError, RuntimeConfig};
pub use services::ServiceContainer;
