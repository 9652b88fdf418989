//! Combines sub-metrics into category scores and a weighted total.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Category, CategoryScore, CategoryWeights, CompetitorContext, Draft, DraftReference,
    ScoreReport, ScoringConfig, SubMetric,
};
use crate::services::metrics::{
    extractors_for, DocumentParser, DraftAnalysis, ExtractionContext, KeywordStats,
    ReadabilityStats,
};

/// Anything that can turn a draft into a [`ScoreReport`].
///
/// The optimization loop scores through this seam; [`Scorer`] is the
/// production implementation.
pub trait DraftScorer: Send + Sync {
    /// Thresholds and weights the scorer was built with.
    fn config(&self) -> &ScoringConfig;

    /// Category weights the total is computed with.
    fn weights(&self) -> &CategoryWeights {
        &self.config().weights
    }

    /// Score `draft` for `keyword` as scoring pass `iteration`.
    fn score(
        &self,
        iteration: u32,
        draft: &Draft,
        keyword: &str,
        competitors: &CompetitorContext,
    ) -> ScoreReport;
}

/// Scores drafts against the weighted rubric.
///
/// Construction validates the category weights and compiles every pattern
/// once; scoring itself is pure and never fails. A sub-metric whose
/// extractor reports an anomaly is recorded as 0 and logged.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScoringConfig,
    parser: DocumentParser,
    cta_patterns: Vec<Regex>,
    stopwords: HashSet<String>,
}

impl Scorer {
    /// Create a scorer for `config`.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidWeights`] if the category weights are
    /// negative, non-finite or do not sum to 1.0.
    pub fn new(config: ScoringConfig) -> DomainResult<Self> {
        if !config.weights.is_valid() {
            return Err(DomainError::InvalidWeights {
                sum: config.weights.sum(),
            });
        }

        let cta_patterns = config
            .cta_phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .map(|p| Regex::new(&format!(r"\b{}\b", regex::escape(&p))))
            .collect::<Result<Vec<_>, _>>()?;
        let stopwords = config.stopwords.iter().map(|w| w.to_lowercase()).collect();

        Ok(Self {
            parser: DocumentParser::new()?,
            cta_patterns,
            stopwords,
            config,
        })
    }

    /// Category weights in use.
    pub const fn weights(&self) -> &CategoryWeights {
        &self.config.weights
    }

    /// Scoring thresholds in use.
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Parse and analyze a draft without scoring it.
    pub fn analyze(&self, draft: &Draft, keyword: &str) -> DraftAnalysis {
        let document = self.parser.parse(&draft.text);
        let readability =
            ReadabilityStats::compute(&document.plain_text, self.config.readability_formula);
        let keyword = KeywordStats::compute(&document.plain_text, keyword, &self.stopwords);
        DraftAnalysis {
            document,
            readability,
            keyword,
        }
    }

    /// Score `draft` for `keyword` as scoring pass `iteration`.
    ///
    /// Identical inputs always produce identical reports.
    pub fn score(
        &self,
        iteration: u32,
        draft: &Draft,
        keyword: &str,
        competitors: &CompetitorContext,
    ) -> ScoreReport {
        let analysis = self.analyze(draft, keyword);
        let ctx = ExtractionContext {
            keyword,
            competitors,
            config: &self.config,
            cta_patterns: &self.cta_patterns,
        };

        let categories: BTreeMap<Category, CategoryScore> = Category::ALL
            .iter()
            .map(|category| {
                let sub_metrics = extractors_for(*category)
                    .map(|extractor| match (extractor.extract)(&analysis, &ctx) {
                        Ok(m) if m.normalized_value.is_finite() && m.raw_value.is_finite() => {
                            SubMetric::new(
                                extractor.name,
                                extractor.weight,
                                m.raw_value,
                                m.normalized_value,
                            )
                        }
                        Ok(_) => {
                            tracing::warn!(
                                metric = extractor.name,
                                category = %category,
                                iteration,
                                "Sub-metric produced a non-finite value; scored as 0"
                            );
                            SubMetric::anomaly(extractor.name, extractor.weight)
                        }
                        Err(anomaly) => {
                            tracing::warn!(
                                metric = extractor.name,
                                category = %category,
                                iteration,
                                error = %anomaly,
                                "Scoring anomaly; sub-metric scored as 0"
                            );
                            SubMetric::anomaly(extractor.name, extractor.weight)
                        }
                    })
                    .collect();
                let score =
                    CategoryScore::new(*category, self.weights().weight(*category), sub_metrics);
                (*category, score)
            })
            .collect();

        let reference = DraftReference::for_text(&draft.text, analysis.document.word_count());
        let report = ScoreReport::new(iteration, categories, reference);

        tracing::debug!(
            keyword,
            iteration,
            total_score = report.total_score(),
            "Scored draft"
        );
        report
    }
}

impl DraftScorer for Scorer {
    fn config(&self) -> &ScoringConfig {
        Self::config(self)
    }

    fn score(
        &self,
        iteration: u32,
        draft: &Draft,
        keyword: &str,
        competitors: &CompetitorContext,
    ) -> ScoreReport {
        Self::score(self, iteration, draft, keyword, competitors)
    }
}
