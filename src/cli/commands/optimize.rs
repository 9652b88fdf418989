//! Implementation of the `seo-refinery optimize` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cli::output::create_spinner;
use crate::domain::models::{Config, ContentType, Grade, RunOutcome, StopReason};
use crate::domain::ports::{CompetitorAnalyzer, ReportRenderer};
use crate::infrastructure::competitor::{FileCompetitorAnalyzer, StaticCompetitorAnalyzer};
use crate::infrastructure::generator::OpenAiDraftGenerator;
use crate::infrastructure::history::JsonlHistoryStore;
use crate::infrastructure::renderer::{JsonRenderer, TableRenderer};
use crate::services::{OptimizationLoop, RunRequest, Scorer};

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Target keyword; repeat to optimize several keywords concurrently
    #[arg(short, long = "keyword", required = true)]
    pub keywords: Vec<String>,

    /// Content type: blog, product, category, guide, comparison
    #[arg(short = 't', long = "type", default_value = "blog")]
    pub content_type: ContentType,

    /// Stop once the total score reaches this value (1-100)
    #[arg(long)]
    pub target_score: Option<f64>,

    /// Maximum number of scoring passes per keyword
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Requested draft length in words
    #[arg(short, long)]
    pub word_count: Option<usize>,

    /// Competitor data file (YAML or JSON)
    #[arg(long)]
    pub competitors: Option<PathBuf>,

    /// Do not persist score history
    #[arg(long)]
    pub no_history: bool,

    /// Directory for the final drafts, one `<run_id>.md` per stopped run
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl OptimizeArgs {
    /// `config` with the command-line overrides applied
    pub fn apply_overrides(&self, config: &Config) -> Config {
        let mut config = config.clone();
        if let Some(target) = self.target_score {
            config.optimization.target_score = target;
        }
        if let Some(max) = self.max_iterations {
            config.optimization.max_iterations = max;
        }
        if self.no_history {
            config.history.enabled = false;
        }
        config
    }

    pub fn requests(&self) -> Vec<RunRequest> {
        self.keywords
            .iter()
            .map(|keyword| RunRequest {
                keyword: keyword.clone(),
                content_type: self.content_type,
                target_word_count: self.word_count,
            })
            .collect()
    }
}

pub async fn execute(
    args: OptimizeArgs,
    config: &Config,
    cancel: CancellationToken,
    json_mode: bool,
) -> Result<()> {
    // Invalid overrides are reported per run as invalid input
    let config = args.apply_overrides(config);

    let scorer = Scorer::new(config.scoring.clone()).context("Invalid scoring configuration")?;
    let analyzer: Arc<dyn CompetitorAnalyzer> = match &args.competitors {
        Some(path) => Arc::new(
            FileCompetitorAnalyzer::load(path)
                .await
                .with_context(|| {
                    format!("Failed to load competitor data from {}", path.display())
                })?,
        ),
        None => Arc::new(StaticCompetitorAnalyzer::empty()),
    };
    let generator = OpenAiDraftGenerator::from_config(&config.generator)
        .context("Failed to set up draft generator")?;

    let mut optimization =
        OptimizationLoop::from_config(&config, analyzer, Arc::new(generator), Arc::new(scorer));
    if config.history.enabled {
        optimization =
            optimization.with_history(Arc::new(JsonlHistoryStore::new(&config.history.dir)));
    }

    let requests = args.requests();
    let spinner = create_spinner(
        format!("Optimizing {} keyword(s)...", requests.len()),
        json_mode,
    );
    let outcomes = optimization.run_many(requests, &cancel).await;
    spinner.finish_and_clear();

    let renderer: Box<dyn ReportRenderer> = if json_mode {
        Box::new(JsonRenderer)
    } else {
        Box::new(TableRenderer::new())
    };
    for outcome in &outcomes {
        println!("{}", renderer.render(outcome));
    }

    if let Some(dir) = &args.output {
        for path in save_drafts(dir, &outcomes).await? {
            tracing::info!(path = %path.display(), "draft saved");
            if !json_mode {
                println!("Saved draft: {}", path.display());
            }
        }
    }

    let aborted = outcomes.iter().filter(|o| !o.is_stopped()).count();
    if aborted > 0 {
        anyhow::bail!("{aborted} of {} run(s) aborted", outcomes.len());
    }
    Ok(())
}

/// Sidecar written next to each saved draft.
#[derive(Debug, Serialize)]
struct DraftMeta<'a> {
    run_id: String,
    keyword: &'a str,
    reason: StopReason,
    total_score: f64,
    grade: Grade,
    iterations: usize,
}

/// Write the final draft of every stopped run to `<dir>/<run_id>.md`, with
/// its score summary in `<dir>/<run_id>.meta.json`.
///
/// Returns the paths of the written drafts. Aborted runs are skipped.
pub async fn save_drafts(dir: &Path, outcomes: &[RunOutcome]) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::new();
    for outcome in outcomes {
        let RunOutcome::Stopped {
            run_id,
            keyword,
            reason,
            final_report,
            final_draft,
            history,
        } = outcome
        else {
            continue;
        };

        let draft_path = dir.join(format!("{run_id}.md"));
        tokio::fs::write(&draft_path, &final_draft.text)
            .await
            .with_context(|| format!("Failed to write {}", draft_path.display()))?;

        let meta = DraftMeta {
            run_id: run_id.to_string(),
            keyword,
            reason: *reason,
            total_score: final_report.total_score(),
            grade: final_report.grade(),
            iterations: history.len(),
        };
        let meta_path = dir.join(format!("{run_id}.meta.json"));
        let meta_json =
            serde_json::to_string_pretty(&meta).context("Failed to serialize draft metadata")?;
        tokio::fs::write(&meta_path, meta_json)
            .await
            .with_context(|| format!("Failed to write {}", meta_path.display()))?;

        written.push(draft_path);
    }
    Ok(written)
}
