//! # Service Wiring
//!
//! Connects collaborator actors through a [`shared_bus::LocalRouter`].
//! Actors never hold references to each other; everything they send goes
//! back through the router as a signed envelope.

pub mod choreography;

pub use choreography::{
    ChoreographyError, ChoreographyOutcome, ResearchChoreography, DEMO_CLIENT,
};
