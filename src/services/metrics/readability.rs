//! Sentence, word and syllable statistics plus Flesch reading ease.

use crate::domain::models::ReadabilityFormula;

/// Vowels used for syllable counting, German umlauts included.
const VOWELS: &str = "aeiouäöüy";

/// Readability statistics of a plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadabilityStats {
    /// Non-empty segments between `.`, `!` and `?`.
    pub sentence_count: usize,
    /// Words after removing non-word characters.
    pub word_count: usize,
    /// Total syllables over all words.
    pub syllable_count: usize,
    /// Words per sentence, 0 without sentences.
    pub avg_sentence_length: f64,
    /// Syllables per word, 0 without words.
    pub avg_syllables_per_word: f64,
    /// Flesch reading ease clamped to `[0, 100]`, 0 without words.
    pub flesch_reading_ease: f64,
}

impl ReadabilityStats {
    /// Compute the statistics of `text` using `formula`.
    pub fn compute(text: &str, formula: ReadabilityFormula) -> Self {
        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count();
        let words = split_words(text);
        let word_count = words.len();
        let syllable_count: usize = words.iter().map(|w| count_syllables(w)).sum();

        let avg_sentence_length = if sentence_count == 0 {
            0.0
        } else {
            word_count as f64 / sentence_count as f64
        };
        let avg_syllables_per_word = if word_count == 0 {
            0.0
        } else {
            syllable_count as f64 / word_count as f64
        };
        let flesch_reading_ease = if sentence_count == 0 || word_count == 0 {
            0.0
        } else {
            flesch(formula, avg_sentence_length, avg_syllables_per_word)
        };

        Self {
            sentence_count,
            word_count,
            syllable_count,
            avg_sentence_length,
            avg_syllables_per_word,
            flesch_reading_ease,
        }
    }
}

/// Flesch reading ease for the given averages, clamped to `[0, 100]`.
pub fn flesch(formula: ReadabilityFormula, asl: f64, asw: f64) -> f64 {
    let score = match formula {
        ReadabilityFormula::Amstad => 58.5f64.mul_add(-asw, 180.0 - asl),
        ReadabilityFormula::English => 84.6f64.mul_add(-asw, 1.015f64.mul_add(-asl, 206.835)),
    };
    score.clamp(0.0, 100.0)
}

/// Split `text` into words, treating every non-word character as a separator.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Count vowel groups in `word`, at least one per word.
pub fn count_syllables(word: &str) -> usize {
    let mut count = 0;
    let mut previous_was_vowel = false;
    for c in word.chars().flat_map(char::to_lowercase) {
        let is_vowel = VOWELS.contains(c);
        if is_vowel && !previous_was_vowel {
            count += 1;
        }
        previous_was_vowel = is_vowel;
    }
    count.max(1)
}
