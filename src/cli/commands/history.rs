//! Implementation of the `seo-refinery history` command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets, Cell, ContentArrangement, Table};
use serde::Serialize;
use uuid::Uuid;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Category, Config, HistoryEntry};
use crate::domain::ports::HistoryStore;
use crate::infrastructure::history::JsonlHistoryStore;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Run ID printed by `optimize`
    pub run_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub run_id: Uuid,
    pub entries: Vec<HistoryEntry>,
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec![Cell::new("Iteration"), Cell::new("Recorded")];
        header.extend(Category::ALL.iter().map(|c| Cell::new(c.label())));
        header.push(Cell::new("Total"));
        table.set_header(header);

        for entry in &self.entries {
            let mut row = vec![
                Cell::new(entry.report.iteration()),
                Cell::new(entry.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")),
            ];
            row.extend(
                Category::ALL
                    .iter()
                    .map(|c| Cell::new(format!("{:.1}", entry.report.category_value(*c)))),
            );
            row.push(Cell::new(format!("{:.1}", entry.report.total_score())));
            table.add_row(row);
        }

        format!("Run {} ({} iteration(s)):\n{table}", self.run_id, self.entries.len())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: HistoryArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = JsonlHistoryStore::new(&config.history.dir);
    let entries = store
        .load(args.run_id)
        .await
        .with_context(|| format!("Failed to load history for run {}", args.run_id))?;

    if entries.is_empty() {
        anyhow::bail!(
            "No history found for run {} in {}",
            args.run_id,
            store.dir().display()
        );
    }

    output(
        &HistoryOutput {
            run_id: args.run_id,
            entries,
        },
        json_mode,
    );
    Ok(())
}
