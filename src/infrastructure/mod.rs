//! Infrastructure layer module
//!
//! Adapters and external integrations:
//! - Configuration management
//! - Logging infrastructure
//! - Score history persistence
//! - Competitor data
//! - Draft generation over HTTP
//! - Report rendering
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod competitor;
pub mod config;
pub mod generator;
pub mod history;
pub mod logging;
pub mod renderer;
