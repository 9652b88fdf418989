//! Aggregated signals about the pages currently ranking for a keyword.

use serde::{Deserialize, Serialize};

/// Benchmarks from the competitor analyzer.
///
/// Every field is optional. An empty context is valid: competitor-relative
/// sub-metrics fall back to absolute thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CompetitorContext {
    /// Keyword the analysis was run for.
    pub keyword: String,
    /// Number of competitor pages that contributed.
    pub competitor_count: usize,
    /// Suggested word count, usually 110% of the competitor mean.
    pub recommended_word_count: Option<usize>,
    /// Mean keyword density across competitors, in percent.
    pub target_keyword_density: Option<f64>,
    /// Suggested number of H2 headings.
    pub recommended_h2_count: Option<usize>,
    /// Most frequent topics across competitors, most frequent first.
    pub common_topics: Vec<String>,
    /// Weaknesses observed across competitors.
    pub content_gaps: Vec<String>,
}

impl CompetitorContext {
    /// A context with no competitor data for `keyword`.
    pub fn empty(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    /// Whether the context carries no competitor signals at all.
    pub fn is_empty(&self) -> bool {
        self.competitor_count == 0
            && self.recommended_word_count.is_none()
            && self.target_keyword_density.is_none()
            && self.recommended_h2_count.is_none()
            && self.common_topics.is_empty()
            && self.content_gaps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context() {
        let ctx = CompetitorContext::empty("gartenmöbel");
        assert!(ctx.is_empty());
        assert_eq!(ctx.keyword, "gartenmöbel");
    }

    #[test]
    fn test_yaml_with_missing_fields_parses() {
        let yaml = "keyword: rust\ncommon_topics: [ownership, borrowing]\n";
        let ctx: CompetitorContext = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ctx.common_topics.len(), 2);
        assert!(ctx.recommended_word_count.is_none());
        assert!(!ctx.is_empty());
    }
}
