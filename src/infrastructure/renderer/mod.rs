//! Report renderers: human-readable tables and JSON

pub mod json;
pub mod table;

pub use json::JsonRenderer;
pub use table::TableRenderer;
