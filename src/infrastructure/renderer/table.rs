//! Table output for run outcomes using comfy-table.

use std::env;
use std::fmt::Write;

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::domain::models::{Category, RunOutcome, ScoreReport};
use crate::domain::ports::ReportRenderer;

/// Renders an outcome as a summary, an iteration table and a category breakdown
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer {
    /// Whether to use colors in output
    use_colors: bool,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// One row per iteration with every category value and the total
    pub fn iterations_table(&self, history: &[ScoreReport]) -> Table {
        let mut table = base_table();
        let mut header = vec![header_cell("Iteration")];
        header.extend(Category::ALL.iter().map(|c| header_cell(c.label())));
        header.push(header_cell("Total"));
        table.set_header(header);

        for report in history {
            let mut row = vec![Cell::new(report.iteration())];
            row.extend(
                Category::ALL
                    .iter()
                    .map(|c| self.score_cell(report.category_value(*c))),
            );
            row.push(self.score_cell(report.total_score()).add_attribute(Attribute::Bold));
            table.add_row(row);
        }
        table
    }

    /// Sub-metrics of every category in `report`
    pub fn breakdown_table(&self, report: &ScoreReport) -> Table {
        let mut table = base_table();
        table.set_header(vec![
            header_cell("Category"),
            header_cell("Metric"),
            header_cell("Raw"),
            header_cell("Score"),
        ]);

        for score in report.categories().values() {
            for metric in score.sub_metrics() {
                let raw = if metric.anomalous {
                    Cell::new("n/a")
                } else {
                    Cell::new(format!("{:.2}", metric.raw_value))
                };
                table.add_row(vec![
                    Cell::new(score.category().label()),
                    Cell::new(&metric.name),
                    raw.set_alignment(CellAlignment::Right),
                    self.score_cell(metric.normalized_value * 100.0),
                ]);
            }
        }
        table
    }

    fn score_cell(&self, value: f64) -> Cell {
        let cell = Cell::new(format!("{value:.1}")).set_alignment(CellAlignment::Right);
        if self.use_colors {
            cell.fg(score_color(value))
        } else {
            cell
        }
    }
}

impl ReportRenderer for TableRenderer {
    fn render(&self, outcome: &RunOutcome) -> String {
        let mut out = String::new();
        match outcome {
            RunOutcome::Stopped {
                run_id,
                keyword,
                reason,
                final_report,
                ..
            } => {
                let _ = writeln!(out, "Keyword:  {keyword}");
                let _ = writeln!(out, "Run:      {run_id}");
                let _ = writeln!(out, "Stopped:  {reason}");
                let _ = writeln!(
                    out,
                    "Score:    {:.1} / 100, grade {}",
                    final_report.total_score(),
                    final_report.grade()
                );
                let _ = writeln!(out, "\n{}", self.iterations_table(outcome.history()));
                let _ = write!(out, "\n{}", self.breakdown_table(final_report));
            }
            RunOutcome::Aborted {
                run_id,
                keyword,
                reason,
                detail,
                history,
            } => {
                let _ = writeln!(out, "Keyword:  {keyword}");
                let _ = writeln!(out, "Run:      {run_id}");
                let _ = writeln!(out, "Aborted:  {reason} ({detail})");
                if history.is_empty() {
                    out.push_str("No iterations were scored.");
                } else {
                    let _ = write!(out, "\n{}", self.iterations_table(history));
                }
            }
        }
        out
    }
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Colors follow the grade bands: green from B, yellow from D, red below
fn score_color(value: f64) -> Color {
    if value >= 75.0 {
        Color::Green
    } else if value >= 50.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AbortReason, CategoryWeights, Draft, DraftReference, StopReason};
    use uuid::Uuid;

    fn report(iteration: u32, value: f64) -> ScoreReport {
        ScoreReport::from_category_values(
            iteration,
            &CategoryWeights::default(),
            |_| value,
            DraftReference::for_text("draft", 1),
        )
    }

    #[test]
    fn test_stopped_outcome_shows_summary_and_iterations() {
        let history = vec![report(1, 40.0), report(2, 80.0)];
        let outcome = RunOutcome::Stopped {
            run_id: Uuid::nil(),
            keyword: "gartenmöbel".to_string(),
            reason: StopReason::TargetReached,
            final_report: history[1].clone(),
            final_draft: Draft::new("text"),
            history,
        };

        let text = TableRenderer::with_colors(false).render(&outcome);
        assert!(text.contains("Keyword:  gartenmöbel"));
        assert!(text.contains("Stopped:  target reached"));
        assert!(text.contains("80.0 / 100"));
        assert!(text.contains("40.0"));
        assert!(text.contains(Category::TechnicalSeo.label()));
    }

    #[test]
    fn test_aborted_outcome_without_history() {
        let outcome = RunOutcome::Aborted {
            run_id: Uuid::nil(),
            keyword: String::new(),
            reason: AbortReason::InvalidInput,
            detail: "keyword must not be empty".to_string(),
            history: Vec::new(),
        };

        let text = TableRenderer::with_colors(false).render(&outcome);
        assert!(text.contains("Aborted:  invalid input (keyword must not be empty)"));
        assert!(text.contains("No iterations were scored."));
    }

    #[test]
    fn test_score_colors() {
        assert_eq!(score_color(90.0), Color::Green);
        assert_eq!(score_color(60.0), Color::Yellow);
        assert_eq!(score_color(10.0), Color::Red);
    }
}
