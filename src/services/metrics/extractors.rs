//! The extractor table: every sub-metric, its category, weight and
//! normalization.
//!
//! Extractors are pure functions over a [`DraftAnalysis`] and an
//! [`ExtractionContext`]. The table order is the order sub-metrics appear in
//! a [`CategoryScore`](crate::domain::models::CategoryScore).

use std::collections::HashSet;

use regex::Regex;

use super::document::DraftDocument;
use super::keyword::{contains_keyword, KeywordStats};
use super::readability::{split_words, ReadabilityStats};
use crate::domain::errors::ScoringAnomaly;
use crate::domain::models::{Category, CompetitorContext, ScoringConfig};

/// Characters at the start of the text checked for the keyword.
pub const KEYWORD_LEAD_CHARS: usize = 200;
/// Related terms for full credit.
pub const RELATED_TERMS_FULL: usize = 10;
/// Related terms for partial credit.
pub const RELATED_TERMS_PARTIAL: usize = 5;
/// Heading points available in total.
pub const HEADING_POINTS_MAX: f64 = 40.0;
/// Average words per paragraph for full credit.
pub const MAX_AVG_PARAGRAPH_WORDS: f64 = 100.0;
/// Average sentence length that still earns partial credit.
pub const LONG_SENTENCE_WORDS: f64 = 25.0;
/// Paragraphs shorter than this many characters are not counted.
pub const MIN_PARAGRAPH_CHARS: usize = 50;
/// Competitor topics considered for coverage.
pub const MAX_TOPICS: usize = 10;
/// Optimal meta title length (characters).
pub const TITLE_OPTIMAL: (usize, usize) = (50, 60);
/// Acceptable meta title length (characters).
pub const TITLE_ACCEPTABLE: (usize, usize) = (40, 70);
/// Optimal meta description length (characters).
pub const DESCRIPTION_OPTIMAL: (usize, usize) = (140, 160);
/// Acceptable meta description length (characters).
pub const DESCRIPTION_ACCEPTABLE: (usize, usize) = (120, 180);

/// Everything derived from one draft, computed once per scoring pass.
#[derive(Debug, Clone)]
pub struct DraftAnalysis {
    /// Structure of the draft.
    pub document: DraftDocument,
    /// Readability of the plain text.
    pub readability: ReadabilityStats,
    /// Keyword usage in the plain text.
    pub keyword: KeywordStats,
}

impl DraftAnalysis {
    /// Whether the plain text has no words at all.
    pub fn has_no_words(&self) -> bool {
        self.readability.word_count == 0
    }
}

/// Inputs shared by all extractors of one scoring pass.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    /// Target keyword.
    pub keyword: &'a str,
    /// Competitor benchmarks, possibly empty.
    pub competitors: &'a CompetitorContext,
    /// Thresholds.
    pub config: &'a ScoringConfig,
    /// Compiled call-to-action patterns.
    pub cta_patterns: &'a [Regex],
}

/// Output of one extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Value in its natural unit.
    pub raw_value: f64,
    /// Value mapped onto `[0, 1]`.
    pub normalized_value: f64,
}

impl Measurement {
    const fn new(raw_value: f64, normalized_value: f64) -> Self {
        Self {
            raw_value,
            normalized_value,
        }
    }
}

/// Signature of an extractor.
pub type ExtractFn = fn(&DraftAnalysis, &ExtractionContext<'_>) -> Extracted;

/// Result of one extractor.
pub type Extracted = Result<Measurement, ScoringAnomaly>;

/// One row of the extractor table.
#[derive(Clone, Copy)]
pub struct Extractor {
    /// Sub-metric name.
    pub name: &'static str,
    /// Category the sub-metric belongs to.
    pub category: Category,
    /// Share of the category value.
    pub weight: f64,
    /// The extractor itself.
    pub extract: ExtractFn,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

macro_rules! extractor {
    ($name:literal, $category:ident, $weight:expr, $extract:ident) => {
        Extractor {
            name: $name,
            category: Category::$category,
            weight: $weight,
            extract: $extract,
        }
    };
}

/// All extractors in canonical category order.
pub const EXTRACTORS: &[Extractor] = &[
    extractor!("keyword_density", KeywordOptimization, 0.40, keyword_density),
    extractor!("keyword_placement", KeywordOptimization, 0.30, keyword_placement),
    extractor!("related_terms", KeywordOptimization, 0.30, related_terms),
    extractor!("heading_structure", StructureReadability, 0.30, heading_structure),
    extractor!("flesch_reading_ease", StructureReadability, 0.30, flesch_reading_ease),
    extractor!("sentence_length", StructureReadability, 0.10, sentence_length),
    extractor!("paragraph_length", StructureReadability, 0.05, paragraph_length),
    extractor!("list_usage", StructureReadability, 0.15, list_usage),
    extractor!("emphasis", StructureReadability, 0.10, emphasis),
    extractor!("length_vs_competition", ContentQuality, 0.40, length_vs_competition),
    extractor!("numeric_facts", ContentQuality, 0.10, numeric_facts),
    extractor!("term_depth", ContentQuality, 0.10, term_depth),
    extractor!("paragraph_count", ContentQuality, 0.10, paragraph_count),
    extractor!("lexical_diversity", ContentQuality, 0.20, lexical_diversity),
    extractor!("topic_coverage", ContentQuality, 0.10, topic_coverage),
    extractor!("meta_title", TechnicalSeo, 0.20, meta_title),
    extractor!("title_keyword", TechnicalSeo, 0.10, title_keyword),
    extractor!("meta_description", TechnicalSeo, 0.20, meta_description),
    extractor!("description_keyword", TechnicalSeo, 0.10, description_keyword),
    extractor!("image_alt_coverage", TechnicalSeo, 0.25, image_alt_coverage),
    extractor!("semantic_markup", TechnicalSeo, 0.15, semantic_markup),
    extractor!("call_to_action", Engagement, 0.40, call_to_action),
    extractor!("images", Engagement, 0.20, images),
    extractor!("video", Engagement, 0.10, video),
    extractor!("links", Engagement, 0.20, links),
    extractor!("interactive_elements", Engagement, 0.10, interactive_elements),
];

/// Extractors of one category, in table order.
pub fn extractors_for(category: Category) -> impl Iterator<Item = &'static Extractor> {
    EXTRACTORS.iter().filter(move |e| e.category == category)
}

/// Map `value` onto the first tier whose threshold it reaches.
///
/// `tiers` are `(threshold, score)` pairs in descending threshold order.
fn tiered(value: f64, tiers: &[(f64, f64)], otherwise: f64) -> f64 {
    tiers
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(otherwise, |(_, score)| *score)
}

fn in_band(value: usize, (low, high): (usize, usize)) -> bool {
    (low..=high).contains(&value)
}

fn require_words(analysis: &DraftAnalysis) -> Result<(), ScoringAnomaly> {
    if analysis.has_no_words() {
        Err(ScoringAnomaly::NoWords)
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Keyword optimization
// ---------------------------------------------------------------------------

fn keyword_density(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    if a.keyword.token_count == 0 {
        return Err(ScoringAnomaly::NoWords);
    }
    let density = a.keyword.density;
    let [opt_low, opt_high] = ctx.config.keyword_density_optimal;
    let [acc_low, acc_high] = ctx.config.keyword_density_acceptable;

    let normalized = if (opt_low..=opt_high).contains(&density) {
        1.0
    } else if (acc_low..opt_low).contains(&density) || (density > opt_high && density <= acc_high) {
        0.625
    } else {
        0.25
    };
    Ok(Measurement::new(density, normalized))
}

fn keyword_placement(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    let lead: String = a.document.plain_text.chars().take(KEYWORD_LEAD_CHARS).collect();
    let headings = &a.document.headings;

    let mut points = 0.0;
    if contains_keyword(&lead, ctx.keyword) {
        points += 1.0;
    }
    if headings.h1.iter().any(|h| contains_keyword(h, ctx.keyword)) {
        points += 1.0;
    }
    match headings.h2.iter().filter(|h| contains_keyword(h, ctx.keyword)).count() {
        0 => {}
        1 => points += 0.5,
        _ => points += 1.0,
    }
    Ok(Measurement::new(points, points / 3.0))
}

fn related_terms(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let count = a.keyword.related_terms.len();
    let normalized = tiered(
        count as f64,
        &[
            (RELATED_TERMS_FULL as f64, 1.0),
            (RELATED_TERMS_PARTIAL as f64, 2.0 / 3.0),
        ],
        1.0 / 3.0,
    );
    Ok(Measurement::new(count as f64, normalized))
}

// ---------------------------------------------------------------------------
// Structure & readability
// ---------------------------------------------------------------------------

fn heading_structure(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let headings = &a.document.headings;
    let h1_points = match headings.h1.len() {
        0 => 0.0,
        1 => 15.0,
        _ => 5.0,
    };
    let h2_points = tiered(headings.h2.len() as f64, &[(5.0, 15.0), (3.0, 10.0)], 5.0);
    let h3_points = tiered(headings.h3.len() as f64, &[(3.0, 10.0), (2.0, 7.0)], 0.0);
    let points = h1_points + h2_points + h3_points;
    Ok(Measurement::new(points, points / HEADING_POINTS_MAX))
}

fn flesch_reading_ease(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let flesch = a.readability.flesch_reading_ease;
    let normalized = tiered(
        flesch,
        &[(ctx.config.good_flesch, 1.0), (ctx.config.acceptable_flesch, 0.6)],
        0.25,
    );
    Ok(Measurement::new(flesch, normalized))
}

fn sentence_length(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let average = a.readability.avg_sentence_length;
    let normalized = if average <= ctx.config.max_avg_sentence_words {
        1.0
    } else if average <= LONG_SENTENCE_WORDS {
        0.7
    } else {
        0.3
    };
    Ok(Measurement::new(average, normalized))
}

fn paragraph_length(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let paragraphs = &a.document.paragraphs;
    if paragraphs.is_empty() {
        return Ok(Measurement::new(0.0, 0.0));
    }
    let words: usize = paragraphs.iter().map(|p| p.split_whitespace().count()).sum();
    let average = words as f64 / paragraphs.len() as f64;
    let normalized = if average <= MAX_AVG_PARAGRAPH_WORDS { 1.0 } else { 0.0 };
    Ok(Measurement::new(average, normalized))
}

fn list_usage(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let count = a.document.list_count as f64;
    Ok(Measurement::new(count, tiered(count, &[(2.0, 1.0), (1.0, 2.0 / 3.0)], 0.0)))
}

fn emphasis(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let count = a.document.emphasis_count as f64;
    Ok(Measurement::new(count, tiered(count, &[(3.0, 1.0), (1.0, 0.5)], 0.0)))
}

// ---------------------------------------------------------------------------
// Content quality
// ---------------------------------------------------------------------------

fn length_vs_competition(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let target = ctx
        .competitors
        .recommended_word_count
        .filter(|n| *n > 0)
        .unwrap_or(ctx.config.default_target_word_count)
        .max(1);
    let ratio = a.document.word_count() as f64 / target as f64;
    let normalized = tiered(ratio, &[(1.0, 1.0), (0.8, 0.75), (0.6, 0.5)], 0.25);
    Ok(Measurement::new(ratio, normalized))
}

fn numeric_facts(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let count = a.document.number_count as f64;
    Ok(Measurement::new(count, tiered(count, &[(10.0, 1.0), (5.0, 0.6)], 0.0)))
}

fn term_depth(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let long_words = a
        .document
        .plain_text
        .split_whitespace()
        .filter(|w| w.chars().count() > ctx.config.long_word_chars)
        .count() as f64;
    Ok(Measurement::new(long_words, tiered(long_words, &[(20.0, 1.0), (10.0, 0.6)], 0.0)))
}

fn paragraph_count(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let count = a
        .document
        .paragraphs
        .iter()
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .count() as f64;
    Ok(Measurement::new(count, tiered(count, &[(8.0, 1.0), (5.0, 0.6)], 0.0)))
}

fn lexical_diversity(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let words: Vec<String> = split_words(&a.document.plain_text)
        .into_iter()
        .map(str::to_lowercase)
        .collect();
    if words.is_empty() {
        return Err(ScoringAnomaly::NoWords);
    }
    let unique = words.iter().collect::<HashSet<_>>().len();
    let ratio = unique as f64 / words.len() as f64;
    Ok(Measurement::new(ratio, tiered(ratio, &[(0.5, 1.0), (0.4, 0.75)], 0.5)))
}

fn topic_coverage(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    require_words(a)?;
    let competitor_topics: Vec<String> = ctx
        .competitors
        .common_topics
        .iter()
        .filter(|t| !t.trim().is_empty())
        .take(MAX_TOPICS)
        .cloned()
        .collect();
    // Without competitor topics the keyword's own terms stand in.
    let topics = if competitor_topics.is_empty() {
        ctx.keyword
            .split_whitespace()
            .map(str::to_string)
            .take(MAX_TOPICS)
            .collect()
    } else {
        competitor_topics
    };
    if topics.is_empty() {
        return Ok(Measurement::new(0.0, 0.0));
    }

    let covered = topics
        .iter()
        .filter(|t| contains_keyword(&a.document.plain_text, t))
        .count();
    let ratio = covered as f64 / topics.len() as f64;
    Ok(Measurement::new(ratio, tiered(ratio, &[(0.7, 1.0), (0.5, 0.7)], 0.4)))
}

// ---------------------------------------------------------------------------
// Technical SEO
// ---------------------------------------------------------------------------

fn length_band_score(length: usize, optimal: (usize, usize), acceptable: (usize, usize)) -> f64 {
    if in_band(length, optimal) {
        1.0
    } else if in_band(length, acceptable) {
        0.75
    } else {
        0.25
    }
}

fn meta_title(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    Ok(a.document.title.as_deref().map_or(Measurement::new(0.0, 0.0), |title| {
        let length = title.chars().count();
        Measurement::new(
            length as f64,
            length_band_score(length, TITLE_OPTIMAL, TITLE_ACCEPTABLE),
        )
    }))
}

fn title_keyword(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    let present = a
        .document
        .title
        .as_deref()
        .is_some_and(|t| contains_keyword(t, ctx.keyword));
    Ok(flag(present))
}

fn meta_description(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    Ok(a
        .document
        .meta_description
        .as_deref()
        .map_or(Measurement::new(0.0, 0.0), |description| {
            let length = description.chars().count();
            Measurement::new(
                length as f64,
                length_band_score(length, DESCRIPTION_OPTIMAL, DESCRIPTION_ACCEPTABLE),
            )
        }))
}

fn description_keyword(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    let present = a
        .document
        .meta_description
        .as_deref()
        .is_some_and(|d| contains_keyword(d, ctx.keyword));
    Ok(flag(present))
}

fn image_alt_coverage(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let images = &a.document.images;
    if images.is_empty() {
        return Ok(Measurement::new(0.0, 0.0));
    }
    let with_alt = images.iter().filter(|i| i.has_alt()).count();
    let ratio = with_alt as f64 / images.len() as f64;
    Ok(Measurement::new(ratio, tiered(ratio, &[(0.9, 1.0), (0.7, 0.72), (0.5, 0.4)], 0.2)))
}

fn semantic_markup(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let count = a.document.semantic_section_count as f64;
    Ok(Measurement::new(count, tiered(count, &[(2.0, 1.0), (1.0, 2.0 / 3.0)], 0.0)))
}

// ---------------------------------------------------------------------------
// Engagement
// ---------------------------------------------------------------------------

fn call_to_action(a: &DraftAnalysis, ctx: &ExtractionContext<'_>) -> Extracted {
    let text = a.document.plain_text.to_lowercase();
    let distinct = ctx.cta_patterns.iter().filter(|p| p.is_match(&text)).count() as f64;
    Ok(Measurement::new(distinct, tiered(distinct, &[(3.0, 1.0), (1.0, 0.625)], 0.0)))
}

fn images(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let count = a.document.images.len() as f64;
    Ok(Measurement::new(count, tiered(count, &[(3.0, 1.0), (1.0, 0.5)], 0.0)))
}

fn video(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let count = a.document.video_count as f64;
    Ok(Measurement::new(count, tiered(count, &[(1.0, 1.0)], 0.0)))
}

fn links(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let count = a.document.link_count as f64;
    Ok(Measurement::new(count, tiered(count, &[(5.0, 1.0), (2.0, 0.6)], 0.0)))
}

fn interactive_elements(a: &DraftAnalysis, _ctx: &ExtractionContext<'_>) -> Extracted {
    let count = a.document.interactive_count as f64;
    Ok(Measurement::new(count, tiered(count, &[(1.0, 1.0)], 0.0)))
}

const fn flag(present: bool) -> Measurement {
    if present {
        Measurement::new(1.0, 1.0)
    } else {
        Measurement::new(0.0, 0.0)
    }
}
