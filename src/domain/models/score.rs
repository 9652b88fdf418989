//! Score reports produced by a single scoring pass.
//!
//! A [`ScoreReport`] is immutable once built. Its `total_score` is always
//! derived from its categories (also on deserialization), so a report can
//! never carry a total that disagrees with its breakdown.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::{Category, CategoryWeights};

/// Namespace for deterministic draft identifiers (UUIDv5 over the draft text).
const DRAFT_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2b7e_93a4_4d0c_9e51_7a2f_c3d8_0b15);

/// A single measured signal inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMetric {
    /// Stable identifier, e.g. `keyword_density`.
    pub name: String,
    /// Share of the category value this metric contributes (sums to 1 per category).
    pub weight: f64,
    /// The measured value in its natural unit (percent, count, ratio, ...).
    pub raw_value: f64,
    /// The measurement mapped onto `[0, 1]`.
    pub normalized_value: f64,
    /// Set when the extractor failed and the metric was scored as 0.
    #[serde(default)]
    pub anomalous: bool,
}

impl SubMetric {
    /// Build a sub-metric, clamping `normalized_value` onto `[0, 1]`.
    pub fn new(
        name: impl Into<String>,
        weight: f64,
        raw_value: f64,
        normalized_value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            weight,
            raw_value,
            normalized_value: normalized_value.clamp(0.0, 1.0),
            anomalous: false,
        }
    }

    /// A sub-metric whose extractor failed. Scored as zero.
    pub fn anomaly(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            raw_value: 0.0,
            normalized_value: 0.0,
            anomalous: true,
        }
    }
}

/// The score of one category, on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CategoryScoreRecord")]
pub struct CategoryScore {
    category: Category,
    weight: f64,
    sub_metrics: Vec<SubMetric>,
    value: f64,
}

impl CategoryScore {
    /// Combine sub-metrics into a category value: `100 * Σ weight * normalized`,
    /// clamped to `[0, 100]`.
    pub fn new(category: Category, weight: f64, sub_metrics: Vec<SubMetric>) -> Self {
        let value = sub_metrics
            .iter()
            .map(|m| m.weight * m.normalized_value)
            .sum::<f64>();
        let value = (value * 100.0).clamp(0.0, 100.0);
        Self {
            category,
            weight,
            sub_metrics,
            value,
        }
    }

    /// The category this score belongs to.
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Weight of this category in the total score.
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Sub-metrics in extractor order.
    pub fn sub_metrics(&self) -> &[SubMetric] {
        &self.sub_metrics
    }

    /// Category value on a 0-100 scale.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Contribution of this category to the total score.
    pub fn weighted_value(&self) -> f64 {
        self.weight * self.value
    }
}

#[derive(Deserialize)]
struct CategoryScoreRecord {
    category: Category,
    weight: f64,
    sub_metrics: Vec<SubMetric>,
}

impl From<CategoryScoreRecord> for CategoryScore {
    fn from(record: CategoryScoreRecord) -> Self {
        Self::new(record.category, record.weight, record.sub_metrics)
    }
}

/// Identifies the draft a report was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReference {
    /// UUIDv5 of the draft text; identical text yields an identical id.
    pub draft_id: Uuid,
    /// Number of whitespace-separated words in the draft's plain text.
    pub word_count: usize,
}

impl DraftReference {
    /// Derive the reference for `text` with a pre-computed word count.
    pub fn for_text(text: &str, word_count: usize) -> Self {
        Self {
            draft_id: Uuid::new_v5(&DRAFT_NAMESPACE, text.as_bytes()),
            word_count,
        }
    }
}

/// Letter grade derived from a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// 90 and above.
    #[serde(rename = "A+")]
    APlus,
    /// 85 to below 90.
    A,
    /// 75 to below 85.
    B,
    /// 65 to below 75.
    C,
    /// 50 to below 65.
    D,
    /// Below 50.
    F,
}

impl Grade {
    /// Map a 0-100 score onto a grade.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::APlus,
            s if s >= 85.0 => Self::A,
            s if s >= 75.0 => Self::B,
            s if s >= 65.0 => Self::C,
            s if s >= 50.0 => Self::D,
            _ => Self::F,
        }
    }

    /// Short descriptor shown next to the grade letter.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::APlus => "excellent",
            Self::A => "very good",
            Self::B => "good",
            Self::C => "satisfactory",
            Self::D => "sufficient",
            Self::F => "insufficient",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        write!(f, "{letter} ({})", self.description())
    }
}

/// The result of scoring one draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ScoreReportRecord")]
pub struct ScoreReport {
    iteration: u32,
    total_score: f64,
    categories: BTreeMap<Category, CategoryScore>,
    draft: DraftReference,
}

impl ScoreReport {
    /// Assemble a report; `total_score` is computed from `categories`.
    pub fn new(
        iteration: u32,
        categories: BTreeMap<Category, CategoryScore>,
        draft: DraftReference,
    ) -> Self {
        let total_score = Self::weighted_total(&categories);
        Self {
            iteration,
            total_score,
            categories,
            draft,
        }
    }

    /// Build a report whose category values are given directly, with no
    /// sub-metric breakdown. Used to replay score sequences.
    pub fn from_category_values(
        iteration: u32,
        weights: &CategoryWeights,
        values: impl Fn(Category) -> f64,
        draft: DraftReference,
    ) -> Self {
        let categories = Category::ALL
            .iter()
            .map(|c| {
                let metric = SubMetric::new("value", 1.0, values(*c), values(*c) / 100.0);
                (*c, CategoryScore::new(*c, weights.weight(*c), vec![metric]))
            })
            .collect();
        Self::new(iteration, categories, draft)
    }

    fn weighted_total(categories: &BTreeMap<Category, CategoryScore>) -> f64 {
        categories
            .values()
            .map(CategoryScore::weighted_value)
            .sum::<f64>()
            .clamp(0.0, 100.0)
    }

    /// 1-based scoring pass that produced this report.
    pub const fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Weighted total on a 0-100 scale.
    pub const fn total_score(&self) -> f64 {
        self.total_score
    }

    /// Category breakdown in canonical order.
    pub const fn categories(&self) -> &BTreeMap<Category, CategoryScore> {
        &self.categories
    }

    /// Score of a single category, if present.
    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.get(&category)
    }

    /// Value of a category, `0.0` when absent.
    pub fn category_value(&self, category: Category) -> f64 {
        self.category(category).map_or(0.0, CategoryScore::value)
    }

    /// Reference to the scored draft.
    pub const fn draft(&self) -> &DraftReference {
        &self.draft
    }

    /// Grade derived from the total score.
    pub fn grade(&self) -> Grade {
        Grade::from_score(self.total_score)
    }

    /// All categories sorted ascending by value; ties keep canonical order.
    pub fn categories_by_weakness(&self) -> Vec<Category> {
        let mut ordered: Vec<Category> = Category::ALL.to_vec();
        ordered.sort_by(|a, b| self.category_value(*a).total_cmp(&self.category_value(*b)));
        ordered
    }
}

#[derive(Deserialize)]
struct ScoreReportRecord {
    iteration: u32,
    categories: BTreeMap<Category, CategoryScore>,
    draft: DraftReference,
}

impl From<ScoreReportRecord> for ScoreReport {
    fn from(record: ScoreReportRecord) -> Self {
        Self::new(record.iteration, record.categories, record.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> DraftReference {
        DraftReference::for_text("draft", 1)
    }

    fn report_with(values: [f64; 5]) -> ScoreReport {
        ScoreReport::from_category_values(
            1,
            &CategoryWeights::default(),
            |c| values[Category::ALL.iter().position(|x| *x == c).unwrap()],
            reference(),
        )
    }

    #[test]
    fn test_category_value_is_weighted_mean_of_sub_metrics() {
        let score = CategoryScore::new(
            Category::StructureReadability,
            0.25,
            vec![
                SubMetric::new("heading_structure", 0.5, 2.0, 1.0),
                SubMetric::new("flesch_reading_ease", 0.5, 30.0, 0.25),
            ],
        );
        assert!((score.value() - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_sub_metric_normalized_value_is_clamped() {
        assert!((SubMetric::new("x", 1.0, 5.0, 1.7).normalized_value - 1.0).abs() < f64::EPSILON);
        assert!(SubMetric::new("x", 1.0, 5.0, -0.2).normalized_value.abs() < f64::EPSILON);
    }

    #[test]
    fn test_total_score_is_weighted_sum() {
        let report = report_with([50.0, 60.0, 70.0, 80.0, 90.0]);
        let expected = 0.20 * 50.0 + 0.25 * 60.0 + 0.30 * 70.0 + 0.15 * 80.0 + 0.10 * 90.0;
        assert!((report.total_score() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_deserialization_recomputes_total_score() {
        let report = report_with([10.0, 20.0, 30.0, 40.0, 50.0]);
        let mut json: serde_json::Value = serde_json::to_value(&report).unwrap();
        json["total_score"] = serde_json::json!(99.0);

        let restored: ScoreReport = serde_json::from_value(json).unwrap();
        assert!((restored.total_score() - report.total_score()).abs() < 1e-9);
        assert_eq!(restored, report);
    }

    #[test]
    fn test_categories_by_weakness_sorts_ascending_with_stable_ties() {
        let report = report_with([50.0, 20.0, 50.0, 10.0, 90.0]);
        assert_eq!(
            report.categories_by_weakness(),
            vec![
                Category::TechnicalSeo,
                Category::StructureReadability,
                Category::KeywordOptimization,
                Category::ContentQuality,
                Category::Engagement,
            ]
        );
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(90.0), Grade::APlus);
        assert_eq!(Grade::from_score(89.99), Grade::A);
        assert_eq!(Grade::from_score(75.0), Grade::B);
        assert_eq!(Grade::from_score(65.0), Grade::C);
        assert_eq!(Grade::from_score(50.0), Grade::D);
        assert_eq!(Grade::from_score(49.9), Grade::F);
        assert_eq!(Grade::APlus.to_string(), "A+ (excellent)");
    }

    #[test]
    fn test_draft_reference_is_deterministic() {
        let a = DraftReference::for_text("same text", 2);
        let b = DraftReference::for_text("same text", 2);
        let c = DraftReference::for_text("other text", 2);
        assert_eq!(a, b);
        assert_ne!(a.draft_id, c.draft_id);
    }
}
