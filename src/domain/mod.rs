//! Domain layer for SEO Refinery
//!
//! Scoring models, convergence state and the collaborator ports. Nothing in
//! here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, ScoringAnomaly};
