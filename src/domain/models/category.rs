//! Scoring categories and their fixed weights.
//!
//! Every [`ScoreReport`](super::ScoreReport) is broken down into the same five
//! [`Category`] values. The weight of each category in the total score comes
//! from [`CategoryWeights`], which must sum to `1.0` within
//! [`WEIGHT_SUM_TOLERANCE`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Allowed deviation of the category weight sum from `1.0`.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// One of the five fixed scoring dimensions.
///
/// The declaration order is the canonical order: it drives iteration over
/// `BTreeMap<Category, _>`, tie-breaking of weak categories, and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Keyword density, placement and related terms.
    KeywordOptimization,
    /// Heading hierarchy, readability and formatting.
    StructureReadability,
    /// Length, depth, diversity and topical coverage.
    ContentQuality,
    /// Meta tags, image alt text and semantic markup.
    #[serde(rename = "technical_seo")]
    TechnicalSeo,
    /// Calls to action, media, links and interactive elements.
    Engagement,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Self; 5] = [
        Self::KeywordOptimization,
        Self::StructureReadability,
        Self::ContentQuality,
        Self::TechnicalSeo,
        Self::Engagement,
    ];

    /// Stable snake_case identifier, matching the serde representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordOptimization => "keyword_optimization",
            Self::StructureReadability => "structure_readability",
            Self::ContentQuality => "content_quality",
            Self::TechnicalSeo => "technical_seo",
            Self::Engagement => "engagement",
        }
    }

    /// Human-readable label used in reports and prompts.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::KeywordOptimization => "Keyword optimization",
            Self::StructureReadability => "Structure & readability",
            Self::ContentQuality => "Content quality",
            Self::TechnicalSeo => "Technical SEO",
            Self::Engagement => "Engagement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative weight of each category in the total score.
///
/// Defaults: keyword 20%, structure 25%, quality 30%, technical 15%,
/// engagement 10%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryWeights {
    /// Weight of [`Category::KeywordOptimization`].
    #[serde(default = "default_keyword_weight")]
    pub keyword_optimization: f64,
    /// Weight of [`Category::StructureReadability`].
    #[serde(default = "default_structure_weight")]
    pub structure_readability: f64,
    /// Weight of [`Category::ContentQuality`].
    #[serde(default = "default_quality_weight")]
    pub content_quality: f64,
    /// Weight of [`Category::TechnicalSeo`].
    #[serde(default = "default_technical_weight")]
    pub technical_seo: f64,
    /// Weight of [`Category::Engagement`].
    #[serde(default = "default_engagement_weight")]
    pub engagement: f64,
}

const fn default_keyword_weight() -> f64 {
    0.20
}

const fn default_structure_weight() -> f64 {
    0.25
}

const fn default_quality_weight() -> f64 {
    0.30
}

const fn default_technical_weight() -> f64 {
    0.15
}

const fn default_engagement_weight() -> f64 {
    0.10
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            keyword_optimization: default_keyword_weight(),
            structure_readability: default_structure_weight(),
            content_quality: default_quality_weight(),
            technical_seo: default_technical_weight(),
            engagement: default_engagement_weight(),
        }
    }
}

impl CategoryWeights {
    /// Weight assigned to `category`.
    pub const fn weight(&self, category: Category) -> f64 {
        match category {
            Category::KeywordOptimization => self.keyword_optimization,
            Category::StructureReadability => self.structure_readability,
            Category::ContentQuality => self.content_quality,
            Category::TechnicalSeo => self.technical_seo,
            Category::Engagement => self.engagement,
        }
    }

    /// Sum of all five weights.
    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    /// Whether every weight is finite and non-negative and the weights sum
    /// to `1.0` within [`WEIGHT_SUM_TOLERANCE`].
    pub fn is_valid(&self) -> bool {
        let components_ok = Category::ALL.iter().all(|c| {
            let w = self.weight(*c);
            w.is_finite() && w >= 0.0
        });
        components_ok && (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = CategoryWeights::default();
        assert!((weights.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
        assert!(weights.is_valid());
    }

    #[test]
    fn test_weights_off_by_more_than_tolerance_are_invalid() {
        let weights = CategoryWeights {
            engagement: 0.11,
            ..CategoryWeights::default()
        };
        assert!(!weights.is_valid());
    }

    #[test]
    fn test_negative_weight_is_invalid_even_if_sum_matches() {
        let weights = CategoryWeights {
            keyword_optimization: -0.10,
            content_quality: 0.60,
            ..CategoryWeights::default()
        };
        assert!((weights.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
        assert!(!weights.is_valid());
    }

    #[test]
    fn test_canonical_order_matches_ord() {
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
    }

    #[test]
    fn test_category_serialization_matches_as_str() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_partial_weights_fill_defaults() {
        let weights: CategoryWeights =
            serde_yaml::from_str("engagement: 0.10\ncontent_quality: 0.30\n").unwrap();
        assert_eq!(weights, CategoryWeights::default());
    }
}
