//! Metric extractors: draft parsing, readability and keyword analysis, and
//! the table of sub-metrics per category.

pub mod document;
pub mod extractors;
pub mod keyword;
pub mod readability;

pub use document::{DocumentParser, DraftDocument, DraftFormat, Headings, Image};
pub use extractors::{
    extractors_for, DraftAnalysis, ExtractionContext, Extracted, Extractor, Measurement,
    EXTRACTORS,
};
pub use keyword::{KeywordStats, RelatedTerm};
pub use readability::ReadabilityStats;
