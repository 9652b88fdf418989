use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::models::{HistoryEntry, ScoreReport};
use crate::domain::ports::{CollaboratorError, HistoryStore};

/// File-backed history: `<dir>/<run_id>.jsonl`, one [`HistoryEntry`] per line
///
/// Appends are serialized through a mutex so that concurrent runs never
/// interleave partial lines.
pub struct JsonlHistoryStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlHistoryStore {
    /// Store rooted at `dir`; the directory is created on first append
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the history of `run_id`
    pub fn run_path(&self, run_id: Uuid) -> PathBuf {
        self.dir.join(format!("{run_id}.jsonl"))
    }
}

#[async_trait]
impl HistoryStore for JsonlHistoryStore {
    async fn append(&self, run_id: Uuid, report: &ScoreReport) -> Result<(), CollaboratorError> {
        let mut line = serde_json::to_string(&HistoryEntry::now(run_id, report.clone()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.run_path(run_id))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::trace!(%run_id, iteration = report.iteration(), "history entry appended");
        Ok(())
    }

    async fn load(&self, run_id: Uuid) -> Result<Vec<HistoryEntry>, CollaboratorError> {
        let contents = match tokio::fs::read_to_string(self.run_path(run_id)).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(CollaboratorError::from))
            .collect()
    }
}
