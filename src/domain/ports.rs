//! Ports (collaborator interfaces) for the optimization loop.
//!
//! The loop only talks to the outside world through these traits. Adapters
//! live in `crate::infrastructure`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::{
    CompetitorContext, Draft, DraftRequest, HistoryEntry, RunOutcome, ScoreReport,
};

/// Errors reported by external collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by upstream service")]
    RateLimited,

    #[error("Upstream server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CollaboratorError {
    /// Whether retrying the same call may succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Network(_) | Self::RateLimited | Self::Server { .. }
        )
    }
}

/// Provides aggregated signals about competing pages for a keyword.
#[async_trait]
pub trait CompetitorAnalyzer: Send + Sync {
    /// Analyze the pages ranking for `keyword`.
    ///
    /// An empty [`CompetitorContext`] is a valid answer.
    async fn analyze(&self, keyword: &str) -> Result<CompetitorContext, CollaboratorError>;
}

/// Produces content drafts.
#[async_trait]
pub trait DraftGenerator: Send + Sync {
    /// Generate a draft. `request.hints` is `None` for the first draft.
    async fn generate(&self, request: &DraftRequest) -> Result<Draft, CollaboratorError>;
}

/// Presents a finished run. Pure consumer, never feeds back into the loop.
pub trait ReportRenderer: Send + Sync {
    /// Render `outcome` for display.
    fn render(&self, outcome: &RunOutcome) -> String;
}

/// Persists score reports per run.
///
/// The loop only appends; `load` is used after a run to inspect it.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append the report of one iteration.
    async fn append(&self, run_id: Uuid, report: &ScoreReport) -> Result<(), CollaboratorError>;

    /// Load all entries of a run in iteration order. Empty when unknown.
    async fn load(&self, run_id: Uuid) -> Result<Vec<HistoryEntry>, CollaboratorError>;
}
