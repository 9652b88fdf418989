use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::score::ScoreReport;

/// One persisted line of a run's history.
///
/// Wall-clock time lives here rather than in the report, so a report stays
/// identical for identical input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Run the report belongs to
    pub run_id: Uuid,
    /// When the report was appended
    pub recorded_at: DateTime<Utc>,
    /// The report itself
    pub report: ScoreReport,
}

impl HistoryEntry {
    /// Wrap `report`, stamping it with the current time.
    pub fn now(run_id: Uuid, report: ScoreReport) -> Self {
        Self {
            run_id,
            recorded_at: Utc::now(),
            report,
        }
    }
}
