//! Implementation of the `seo-refinery score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{CompetitorContext, Config, Draft, ScoreReport};
use crate::domain::ports::CompetitorAnalyzer;
use crate::infrastructure::competitor::FileCompetitorAnalyzer;
use crate::infrastructure::renderer::TableRenderer;
use crate::services::Scorer;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Draft file (Markdown or HTML)
    pub file: PathBuf,

    /// Target keyword
    #[arg(short, long)]
    pub keyword: String,

    /// Competitor data file (YAML or JSON)
    #[arg(long)]
    pub competitors: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ScoreOutput {
    pub file: PathBuf,
    pub keyword: String,
    pub report: ScoreReport,
}

impl CommandOutput for ScoreOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("File:     {}", self.file.display()),
            format!("Keyword:  {}", self.keyword),
            format!(
                "Score:    {:.1} / 100, grade {}",
                self.report.total_score(),
                self.report.grade()
            ),
            String::new(),
        ];
        lines.push(
            TableRenderer::new()
                .breakdown_table(&self.report)
                .to_string(),
        );
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ScoreArgs, config: &Config, json_mode: bool) -> Result<()> {
    let keyword = args.keyword.trim().to_string();
    if keyword.is_empty() {
        anyhow::bail!("Keyword must not be empty");
    }

    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read draft from {}", args.file.display()))?;
    let draft = Draft::new(text);
    if draft.is_blank() {
        anyhow::bail!("Draft {} is empty", args.file.display());
    }

    let competitors = match &args.competitors {
        Some(path) => FileCompetitorAnalyzer::load(path)
            .await
            .with_context(|| format!("Failed to load competitor data from {}", path.display()))?
            .analyze(&keyword)
            .await
            .context("Failed to analyze competitors")?,
        None => CompetitorContext::empty(&keyword),
    };

    let scorer = Scorer::new(config.scoring.clone()).context("Invalid scoring configuration")?;
    let report = scorer.score(1, &draft, &keyword, &competitors);

    output(
        &ScoreOutput {
            file: args.file,
            keyword,
            report,
        },
        json_mode,
    );
    Ok(())
}
