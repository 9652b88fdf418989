//! Improvement suggestions derived from a score report.

use crate::domain::models::{Category, Draft, RevisionHints, ScoreReport, ScoringConfig, SubMetric};

/// Build the hints attached to a revision request.
///
/// `weak_categories` is passed through unchanged. Suggestions are produced
/// for every sub-metric that fell short inside a category scoring below
/// `config.weak_category_threshold`, in canonical category order.
pub fn build_hints(
    report: &ScoreReport,
    weak_categories: Vec<Category>,
    config: &ScoringConfig,
    previous_draft: Draft,
) -> RevisionHints {
    RevisionHints {
        weak_categories,
        suggestions: suggestions(report, config),
        previous_draft,
    }
}

/// Suggestions for every shortfall in categories below the weak threshold.
///
/// Targets quoted in the text follow the thresholds of `config`.
pub fn suggestions(report: &ScoreReport, config: &ScoringConfig) -> Vec<String> {
    report
        .categories()
        .values()
        .filter(|score| score.value() < config.weak_category_threshold)
        .flat_map(|score| {
            score
                .sub_metrics()
                .iter()
                .filter(|m| m.normalized_value < 1.0)
                .filter_map(|m| suggestion_for(m, config))
        })
        .collect()
}

fn suggestion_for(metric: &SubMetric, config: &ScoringConfig) -> Option<String> {
    if metric.anomalous {
        return Some(format!(
            "{}: could not be measured, check the draft content",
            metric.name
        ));
    }
    let raw = metric.raw_value;
    let text = match metric.name.as_str() {
        "keyword_density" => {
            let [low, high] = config.keyword_density_optimal;
            format!("Adjust keyword density to {low}-{high}% (currently {raw:.2}%)")
        }
        "keyword_placement" => "Use the keyword in the first paragraph, the H1 and at least two \
                                H2 headings"
            .to_string(),
        "related_terms" => format!("Add more related terms ({raw:.0} found, aim for 10+)"),
        "heading_structure" => {
            "Use exactly one H1, at least five H2 and several H3 headings".to_string()
        }
        "flesch_reading_ease" => format!(
            "Improve readability (Flesch {raw:.1}, aim for {}+)",
            config.good_flesch
        ),
        "sentence_length" => format!(
            "Shorten sentences (average {raw:.1} words, aim for {} or fewer)",
            config.max_avg_sentence_words
        ),
        "paragraph_length" => format!("Split long paragraphs (average {raw:.0} words)"),
        "list_usage" => format!("Add bullet or numbered lists ({raw:.0} found, aim for 2+)"),
        "emphasis" => format!("Highlight key terms in bold ({raw:.0} found, aim for 3+)"),
        "length_vs_competition" => format!(
            "Expand the text ({:.0}% of the recommended length)",
            raw * 100.0
        ),
        "numeric_facts" => {
            format!("Add concrete numbers and facts ({raw:.0} found, aim for 10+)")
        }
        "term_depth" => format!(
            "Go deeper with domain terminology ({raw:.0} words over {} characters found)",
            config.long_word_chars
        ),
        "paragraph_count" => {
            format!("Add more substantial paragraphs ({raw:.0} found, aim for 8+)")
        }
        "lexical_diversity" => {
            format!("Vary the vocabulary (unique word ratio {:.0}%)", raw * 100.0)
        }
        "topic_coverage" => format!(
            "Cover more of the topics competitors address ({:.0}% covered)",
            raw * 100.0
        ),
        "meta_title" if raw <= 0.0 => "Add a meta title of 50-60 characters".to_string(),
        "meta_title" => {
            format!("Adjust the meta title to 50-60 characters (currently {raw:.0})")
        }
        "title_keyword" => "Include the keyword in the meta title".to_string(),
        "meta_description" if raw <= 0.0 => {
            "Add a meta description of 140-160 characters".to_string()
        }
        "meta_description" => format!(
            "Adjust the meta description to 140-160 characters (currently {raw:.0})"
        ),
        "description_keyword" => "Include the keyword in the meta description".to_string(),
        "image_alt_coverage" if raw <= 0.0 => "Add images with descriptive alt text".to_string(),
        "image_alt_coverage" => {
            format!("Add alt text to every image ({:.0}% covered)", raw * 100.0)
        }
        "semantic_markup" => "Organize the content into clear sections".to_string(),
        "call_to_action" => format!("Add calls to action ({raw:.0} found, aim for 3+)"),
        "images" => format!("Add more images ({raw:.0} found, aim for 3+)"),
        "video" => "Consider embedding a video".to_string(),
        "links" => format!("Add helpful links ({raw:.0} found, aim for 5+)"),
        "interactive_elements" => {
            "Consider an interactive element such as a button or form".to_string()
        }
        _ => return None,
    };
    Some(text)
}
