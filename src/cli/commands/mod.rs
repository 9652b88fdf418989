//! CLI command implementations.

pub mod history;
pub mod optimize;
pub mod score;
