use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{HistoryEntry, ScoreReport};
use crate::domain::ports::{CollaboratorError, HistoryStore};

/// Process-local history store
#[derive(Default)]
pub struct InMemoryHistoryStore {
    runs: Mutex<HashMap<Uuid, Vec<HistoryEntry>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of runs with at least one entry
    pub fn run_count(&self) -> usize {
        self.runs.lock().map_or(0, |runs| runs.len())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, run_id: Uuid, report: &ScoreReport) -> Result<(), CollaboratorError> {
        let mut runs = self
            .runs
            .lock()
            .map_err(|e| {
                CollaboratorError::InvalidResponse(format!("history lock poisoned: {e}"))
            })?;
        runs.entry(run_id)
            .or_default()
            .push(HistoryEntry::now(run_id, report.clone()));
        Ok(())
    }

    async fn load(&self, run_id: Uuid) -> Result<Vec<HistoryEntry>, CollaboratorError> {
        let runs = self
            .runs
            .lock()
            .map_err(|e| {
                CollaboratorError::InvalidResponse(format!("history lock poisoned: {e}"))
            })?;
        Ok(runs.get(&run_id).cloned().unwrap_or_default())
    }
}
