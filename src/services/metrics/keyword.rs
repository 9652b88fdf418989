//! Keyword occurrence, density and related-term analysis.

use std::collections::{HashMap, HashSet};

use super::readability::split_words;

/// Tokens shorter than this many characters are ignored.
const MIN_TOKEN_CHARS: usize = 3;
/// Most frequent tokens considered for related terms.
const RELATED_CANDIDATES: usize = 50;
/// Minimum occurrences of a related term.
const RELATED_MIN_COUNT: usize = 2;
/// Upper bound on reported related terms.
const RELATED_MAX_TERMS: usize = 20;

/// A frequent term other than the keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedTerm {
    /// Lowercase token.
    pub term: String,
    /// Occurrences in the text.
    pub count: usize,
}

/// Keyword statistics of a plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordStats {
    /// Number of tokens (lowercase words of at least three characters).
    pub token_count: usize,
    /// Case-insensitive, non-overlapping occurrences of the keyword.
    pub occurrences: usize,
    /// `occurrences / token_count * 100`, 0 without tokens.
    pub density: f64,
    /// Most frequent non-stopword tokens, most frequent first.
    pub related_terms: Vec<RelatedTerm>,
}

impl KeywordStats {
    /// Analyze `text` for `keyword`.
    pub fn compute(text: &str, keyword: &str, stopwords: &HashSet<String>) -> Self {
        let tokens = tokenize(text);
        let keyword_lower = keyword.trim().to_lowercase();

        let occurrences = if keyword_lower.is_empty() {
            0
        } else {
            text.to_lowercase().matches(keyword_lower.as_str()).count()
        };
        let density = if tokens.is_empty() {
            0.0
        } else {
            occurrences as f64 / tokens.len() as f64 * 100.0
        };

        Self {
            token_count: tokens.len(),
            occurrences,
            density,
            related_terms: related_terms(&tokens, &keyword_lower, stopwords),
        }
    }
}

/// Lowercase words of at least three characters.
pub fn tokenize(text: &str) -> Vec<String> {
    split_words(text)
        .into_iter()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
        .collect()
}

/// Whether `haystack` contains `keyword`, ignoring case.
pub fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    let keyword = keyword.trim().to_lowercase();
    !keyword.is_empty() && haystack.to_lowercase().contains(&keyword)
}

fn related_terms(
    tokens: &[String],
    keyword: &str,
    stopwords: &HashSet<String>,
) -> Vec<RelatedTerm> {
    // (count, first position) per token; ties keep first-occurrence order.
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        counts.entry(token.as_str()).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(term, (count, first))| (term, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(RELATED_CANDIDATES)
        .filter(|(term, count, _)| {
            *count >= RELATED_MIN_COUNT && *term != keyword && !stopwords.contains(*term)
        })
        .take(RELATED_MAX_TERMS)
        .map(|(term, count, _)| RelatedTerm {
            term: term.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stopwords() -> HashSet<String> {
        ["und", "die"].iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_density() {
        let text = "Gartenmöbel aus Holz. Gartenmöbel aus Metall und die Pflege.";
        let stats = KeywordStats::compute(text, "Gartenmöbel", &stopwords());

        // gartenmöbel, aus, holz, gartenmöbel, aus, metall, und, die, pflege
        assert_eq!(stats.token_count, 9);
        assert_eq!(stats.occurrences, 2);
        assert!((stats.density - 2.0 / 9.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_related_terms_exclude_keyword_and_stopwords() {
        let text = "holz holz holz metall metall und und und gartenmöbel gartenmöbel pflege";
        let stats = KeywordStats::compute(text, "gartenmöbel", &stopwords());

        let terms: Vec<&str> = stats.related_terms.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(terms, vec!["holz", "metall"]);
        assert_eq!(stats.related_terms[0].count, 3);
    }

    #[test]
    fn test_related_terms_are_capped() {
        let text: String = (0..30)
            .map(|i| format!("term{i:02} term{i:02} "))
            .collect();
        let stats = KeywordStats::compute(&text, "keyword", &HashSet::new());
        assert_eq!(stats.related_terms.len(), RELATED_MAX_TERMS);
        assert_eq!(stats.related_terms[0].term, "term00");
    }

    #[test]
    fn test_multi_word_keyword_is_substring_match() {
        let stats = KeywordStats::compute(
            "Gartenmöbel aus Holz sind schön. Wer Gartenmöbel aus Holz sucht...",
            "gartenmöbel aus holz",
            &HashSet::new(),
        );
        assert_eq!(stats.occurrences, 2);
    }

    #[test]
    fn test_contains_keyword() {
        assert!(contains_keyword("Die besten GARTENMÖBEL 2024", "gartenmöbel"));
        assert!(!contains_keyword("Terrasse", "gartenmöbel"));
        assert!(!contains_keyword("anything", "  "));
    }
}
