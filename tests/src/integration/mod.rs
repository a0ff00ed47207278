//! Integration tests across service boundaries.

#[cfg(test)]
pub mod harness;

pub mod e2e_research;
pub mod flows;
pub mod health;
pub mod security;
