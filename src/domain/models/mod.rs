pub mod category;
pub mod competitor;
pub mod config;
pub mod convergence;
pub mod draft;
pub mod history;
pub mod score;

pub use category::{Category, CategoryWeights, WEIGHT_SUM_TOLERANCE};
pub use competitor::CompetitorContext;
pub use config::{
    Config, GeneratorConfig, HistoryConfig, LoggingConfig, OptimizationConfig,
    ReadabilityFormula, RetryConfig, ScoringConfig,
};
pub use convergence::{AbortReason, ConvergenceState, Decision, LoopPhase, RunOutcome, StopReason};
pub use draft::{ContentFocus, ContentType, Draft, DraftRequest, RevisionHints};
pub use history::HistoryEntry;
pub use score::{CategoryScore, DraftReference, Grade, ScoreReport, SubMetric};
