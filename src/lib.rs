//! SEO Refinery - content scoring and iterative refinement
//!
//! SEO Refinery scores content drafts against a weighted, multi-factor rubric
//! and drives a generate/score/revise loop until the draft reaches a target
//! score, stops improving, or the iteration budget is used up.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Scores, drafts, convergence state and collaborator ports
//! - **Service Layer** (`services`): Metric extractors, scorer, convergence policy,
//!   optimization loop
//! - **Infrastructure Layer** (`infrastructure`): Config, logging, history, generator and
//!   renderer adapters
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use seo_refinery::{CompetitorContext, Draft, Scorer, ScoringConfig};
//!
//! let scorer = Scorer::new(ScoringConfig::default())?;
//! let report = scorer.score(1, &Draft::new(text), "gartenmöbel", &CompetitorContext::default());
//! println!("{:.1} ({})", report.total_score(), report.grade());
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AbortReason, Category, CategoryScore, CategoryWeights, CompetitorContext, Config,
    ContentType, ConvergenceState, Decision, Draft, DraftRequest, Grade, RunOutcome,
    ScoreReport, ScoringConfig, StopReason, SubMetric,
};
pub use domain::ports::{
    CollaboratorError, CompetitorAnalyzer, DraftGenerator, HistoryStore, ReportRenderer,
};
pub use domain::{DomainError, DomainResult, ScoringAnomaly};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConvergencePolicy, DraftScorer, OptimizationLoop, RunRequest, Scorer};
