//! Score history persistence
//!
//! - `JsonlHistoryStore`: one JSON-lines file per run
//! - `InMemoryHistoryStore`: process-local, for tests and `--no-history` runs

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlHistoryStore;
pub use memory::InMemoryHistoryStore;
