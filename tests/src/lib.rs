//! # A2A-Research Test Suite
//!
//! Cross-service tests that run real registry and service instances on
//! loopback ports.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs        # registry + services on 127.0.0.1:0
//!     ├── e2e_research.rs   # orchestrated research over HTTP
//!     ├── health.rs         # heartbeats and health probes
//!     ├── flows.rs          # actor dispatch through the local router
//!     └── security.rs       # signed request verification
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p a2a-tests
//! cargo test -p a2a-tests integration::e2e_research::
//! ```

pub mod integration;
