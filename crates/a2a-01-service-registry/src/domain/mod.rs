//! Registry configuration and errors.

pub mod config;
pub mod errors;

pub use config::RegistryConfig;
pub use errors::RegistryError;
