//! Competitor analyzers
//!
//! Search-result scraping is out of scope; these adapters serve prepared
//! competitor data.

pub mod file;
pub mod static_analyzer;

pub use file::FileCompetitorAnalyzer;
pub use static_analyzer::StaticCompetitorAnalyzer;
