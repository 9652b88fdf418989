//! Convergence state, decisions and run outcomes.
//!
//! The optimization loop owns exactly one [`ConvergenceState`] per run. The
//! convergence policy reads it and returns a [`Decision`]; the loop maps
//! terminal decisions onto a [`RunOutcome`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::draft::Draft;
use super::score::ScoreReport;
use crate::domain::errors::{DomainError, DomainResult};

/// Accumulated history of one optimization run.
///
/// History is append-only and `iterations_used` can never exceed
/// `max_iterations`: [`record`](Self::record) refuses a report past the budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConvergenceStateRecord")]
pub struct ConvergenceState {
    history: Vec<ScoreReport>,
    target_score: f64,
    max_iterations: u32,
}

impl ConvergenceState {
    /// Empty state for a run with the given target and iteration budget.
    pub const fn new(target_score: f64, max_iterations: u32) -> Self {
        Self {
            history: Vec::new(),
            target_score,
            max_iterations,
        }
    }

    /// Append the report of the latest scoring pass.
    pub fn record(&mut self, report: ScoreReport) -> DomainResult<()> {
        if self.iterations_used() >= self.max_iterations {
            return Err(DomainError::IterationBudgetExceeded {
                max_iterations: self.max_iterations,
            });
        }
        self.history.push(report);
        Ok(())
    }

    /// Reports in iteration order.
    pub fn history(&self) -> &[ScoreReport] {
        &self.history
    }

    /// Consume the state, returning its history.
    pub fn into_history(self) -> Vec<ScoreReport> {
        self.history
    }

    /// The most recent report.
    pub fn latest(&self) -> Option<&ScoreReport> {
        self.history.last()
    }

    /// The report before the most recent one.
    pub fn previous(&self) -> Option<&ScoreReport> {
        self.history.iter().rev().nth(1)
    }

    /// Score the run is aiming for.
    pub const fn target_score(&self) -> f64 {
        self.target_score
    }

    /// Maximum number of scoring passes.
    pub const fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Number of scoring passes recorded so far.
    pub fn iterations_used(&self) -> u32 {
        u32::try_from(self.history.len()).unwrap_or(u32::MAX)
    }
}

#[derive(Deserialize)]
struct ConvergenceStateRecord {
    history: Vec<ScoreReport>,
    target_score: f64,
    max_iterations: u32,
}

impl TryFrom<ConvergenceStateRecord> for ConvergenceState {
    type Error = DomainError;

    /// Replays the history through [`ConvergenceState::record`].
    fn try_from(record: ConvergenceStateRecord) -> DomainResult<Self> {
        let mut state = Self::new(record.target_score, record.max_iterations);
        for report in record.history {
            state.record(report)?;
        }
        Ok(state)
    }
}

/// Why a run stopped normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The latest total score reached the target.
    TargetReached,
    /// The last iteration improved the total by less than epsilon.
    NoImprovement,
    /// The iteration budget is used up.
    MaxIterations,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TargetReached => "target reached",
            Self::NoImprovement => "no further improvement",
            Self::MaxIterations => "iteration budget exhausted",
        })
    }
}

/// Why a run was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// Bad configuration or request; no scoring was performed.
    InvalidInput,
    /// A collaborator kept failing after the configured retries.
    ExternalFailure,
    /// The run was cancelled from outside.
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidInput => "invalid input",
            Self::ExternalFailure => "external failure",
            Self::Cancelled => "cancelled",
        })
    }
}

/// What the convergence policy wants the loop to do next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Terminate with the latest report.
    Stop {
        /// Why the run stops.
        reason: StopReason,
    },
    /// Request a revision; categories are weakest first.
    Continue {
        /// Categories sorted ascending by value.
        weak_categories: Vec<Category>,
    },
    /// Terminate without a usable result.
    Abort {
        /// Why the run aborts.
        reason: AbortReason,
    },
}

/// States of the optimization loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    /// Validating inputs and fetching the first draft.
    Init,
    /// Scoring the current draft.
    Scoring,
    /// Evaluating the convergence policy.
    Deciding,
    /// Requesting a revised draft.
    Continuing,
    /// Terminal: finished with a report.
    Stopped,
    /// Terminal: finished without a result.
    Aborted,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Scoring => "scoring",
            Self::Deciding => "deciding",
            Self::Continuing => "continuing",
            Self::Stopped => "stopped",
            Self::Aborted => "aborted",
        })
    }
}

/// The terminal result of one optimization run.
///
/// Every run ends in exactly one of these variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The run finished with a final report.
    Stopped {
        /// Run identifier, also the history key.
        run_id: Uuid,
        /// Target keyword.
        keyword: String,
        /// Why the run stopped.
        reason: StopReason,
        /// Report of the last scoring pass.
        final_report: ScoreReport,
        /// The draft the final report was computed from.
        final_draft: Draft,
        /// All reports in iteration order.
        history: Vec<ScoreReport>,
    },
    /// The run ended without a usable result.
    Aborted {
        /// Run identifier, also the history key.
        run_id: Uuid,
        /// Target keyword.
        keyword: String,
        /// Why the run aborted.
        reason: AbortReason,
        /// Human-readable detail.
        detail: String,
        /// Reports recorded before the abort.
        history: Vec<ScoreReport>,
    },
}

impl RunOutcome {
    /// Run identifier.
    pub const fn run_id(&self) -> Uuid {
        match self {
            Self::Stopped { run_id, .. } | Self::Aborted { run_id, .. } => *run_id,
        }
    }

    /// Target keyword.
    pub fn keyword(&self) -> &str {
        match self {
            Self::Stopped { keyword, .. } | Self::Aborted { keyword, .. } => keyword,
        }
    }

    /// Reports recorded during the run.
    pub fn history(&self) -> &[ScoreReport] {
        match self {
            Self::Stopped { history, .. } | Self::Aborted { history, .. } => history,
        }
    }

    /// Whether the run finished with a report.
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped { .. })
    }

    /// The final report of a stopped run, or the latest partial report.
    pub fn final_report(&self) -> Option<&ScoreReport> {
        match self {
            Self::Stopped { final_report, .. } => Some(final_report),
            Self::Aborted { history, .. } => history.last(),
        }
    }

    /// Number of scoring passes performed.
    pub fn scoring_passes(&self) -> usize {
        self.history().len()
    }
}
