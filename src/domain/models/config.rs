use serde::{Deserialize, Serialize};

use super::category::CategoryWeights;

/// Main configuration structure for SEO Refinery
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Loop targets and budgets
    #[serde(default)]
    pub optimization: OptimizationConfig,

    /// Category weights and sub-metric thresholds
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Retry and timeout policy for external calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Draft generator endpoint
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Score history persistence
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Optimization loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OptimizationConfig {
    /// Total score at which a run stops (1-100)
    #[serde(default = "default_target_score")]
    pub target_score: f64,

    /// Maximum number of scoring passes per run (>= 1)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Minimum improvement between two iterations to keep going
    #[serde(default = "default_no_improvement_epsilon")]
    pub no_improvement_epsilon: f64,

    /// Requested draft length when competitors give no recommendation
    #[serde(default = "default_word_count")]
    pub default_word_count: usize,
}

const fn default_target_score() -> f64 {
    75.0
}

const fn default_max_iterations() -> u32 {
    5
}

const fn default_no_improvement_epsilon() -> f64 {
    1.0
}

const fn default_word_count() -> usize {
    1000
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            target_score: default_target_score(),
            max_iterations: default_max_iterations(),
            no_improvement_epsilon: default_no_improvement_epsilon(),
            default_word_count: default_word_count(),
        }
    }
}

/// Readability formula used for the Flesch reading ease sub-metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadabilityFormula {
    /// Amstad's German adaptation: `180 - ASL - 58.5 * ASW`
    #[default]
    Amstad,
    /// Original English formula: `206.835 - 1.015 * ASL - 84.6 * ASW`
    English,
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Category weights, must sum to 1.0
    #[serde(default)]
    pub weights: CategoryWeights,

    /// Flesch formula variant
    #[serde(default)]
    pub readability_formula: ReadabilityFormula,

    /// Keyword density band (percent) scored as optimal
    #[serde(default = "default_density_optimal")]
    pub keyword_density_optimal: [f64; 2],

    /// Keyword density band (percent) scored as acceptable
    #[serde(default = "default_density_acceptable")]
    pub keyword_density_acceptable: [f64; 2],

    /// Word count target when competitors give no recommendation
    #[serde(default = "default_word_count")]
    pub default_target_word_count: usize,

    /// Flesch score regarded as easy to read
    #[serde(default = "default_good_flesch")]
    pub good_flesch: f64,

    /// Flesch score regarded as acceptable
    #[serde(default = "default_acceptable_flesch")]
    pub acceptable_flesch: f64,

    /// Average sentence length (words) regarded as optimal
    #[serde(default = "default_max_avg_sentence_words")]
    pub max_avg_sentence_words: f64,

    /// Words longer than this many characters count as domain terms
    #[serde(default = "default_long_word_chars")]
    pub long_word_chars: usize,

    /// Categories below this value get improvement suggestions
    #[serde(default = "default_weak_category_threshold")]
    pub weak_category_threshold: f64,

    /// Phrases counted as calls to action (matched on word boundaries)
    #[serde(default = "default_cta_phrases")]
    pub cta_phrases: Vec<String>,

    /// Words excluded from related-term extraction
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,
}

const fn default_density_optimal() -> [f64; 2] {
    [1.0, 3.0]
}

const fn default_density_acceptable() -> [f64; 2] {
    [0.5, 4.0]
}

const fn default_good_flesch() -> f64 {
    60.0
}

const fn default_acceptable_flesch() -> f64 {
    40.0
}

const fn default_max_avg_sentence_words() -> f64 {
    20.0
}

const fn default_long_word_chars() -> usize {
    12
}

const fn default_weak_category_threshold() -> f64 {
    70.0
}

fn default_cta_phrases() -> Vec<String> {
    [
        "jetzt",
        "hier",
        "mehr erfahren",
        "kaufen",
        "bestellen",
        "kontakt",
        "anfrage",
        "kostenlos",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_stopwords() -> Vec<String> {
    [
        "der", "die", "das", "den", "dem", "des", "ein", "eine", "einer", "eines", "und",
        "oder", "aber", "ist", "sind", "war", "waren", "wird", "werden", "hat", "haben",
        "hatte", "hatten", "kann", "können", "konnte", "konnten", "muss", "müssen", "musste",
        "mussten", "soll", "sollen", "sollte", "sollten", "für", "mit", "auf", "bei", "von",
        "zu", "im", "am", "an", "als", "auch", "nicht", "nur", "noch", "mehr", "sehr", "wie",
        "was", "wenn", "dass", "weil", "sich", "sie", "er", "es", "wir", "ihr", "ich", "du",
        "man", "diese", "sein", "dieser", "dieses", "alle", "jede", "jeder", "jedes", "nach",
        "über", "vor", "aus", "durch", "um", "bis", "zum", "zur", "beim", "vom", "ins", "ans",
        "gegen", "ohne", "seit", "während", "wegen", "trotz", "statt", "außer", "hier", "da",
        "dort", "dann", "nun", "schon", "immer", "nie", "heute", "morgen", "gestern", "jetzt",
        "bald", "oft", "manchmal", "the", "and", "for", "with", "that", "this", "are", "you",
        "your", "from", "have", "not", "but", "can", "all", "more",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            readability_formula: ReadabilityFormula::default(),
            keyword_density_optimal: default_density_optimal(),
            keyword_density_acceptable: default_density_acceptable(),
            default_target_word_count: default_word_count(),
            good_flesch: default_good_flesch(),
            acceptable_flesch: default_acceptable_flesch(),
            max_avg_sentence_words: default_max_avg_sentence_words(),
            long_word_chars: default_long_word_chars(),
            weak_category_threshold: default_weak_category_threshold(),
            cta_phrases: default_cta_phrases(),
            stopwords: default_stopwords(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Timeout applied to every single external call
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    1
}

const fn default_call_timeout_secs() -> u64 {
    120
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    5000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            call_timeout_secs: default_call_timeout_secs(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GeneratorConfig {
    /// API key (can also be set via `OPENAI_API_KEY` env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for API (for testing/proxies)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion token limit
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

const fn default_max_tokens() -> u32 {
    3000
}

const fn default_temperature() -> f32 {
    0.7
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Score history persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HistoryConfig {
    /// Persist every report of every run
    #[serde(default = "default_history_enabled")]
    pub enabled: bool,

    /// Directory holding one `<run_id>.jsonl` file per run
    #[serde(default = "default_history_dir")]
    pub dir: String,
}

const fn default_history_enabled() -> bool {
    true
}

fn default_history_dir() -> String {
    ".seo-refinery/history".to_string()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_history_enabled(),
            dir: default_history_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rotated JSON log files; stderr only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
