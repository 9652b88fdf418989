//! End-to-end optimization runs with the production scorer and scripted collaborators.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use seo_refinery::domain::models::{
    AbortReason, CompetitorContext, Config, ContentType, Draft, DraftRequest, RunOutcome,
    StopReason,
};
use seo_refinery::domain::ports::{
    CollaboratorError, CompetitorAnalyzer, DraftGenerator, HistoryStore,
};
use seo_refinery::infrastructure::competitor::StaticCompetitorAnalyzer;
use seo_refinery::infrastructure::history::InMemoryHistoryStore;
use seo_refinery::services::{OptimizationLoop, RetryPolicy, RunRequest, Scorer};
use tokio_util::sync::CancellationToken;

const THIN_DRAFT: &str = "Gartenmöbel sind schön.";

const RICH_DRAFT: &str = "---
title: Gartenmöbel aus Holz - Ratgeber für langlebige Terrassenmöbel
description: Gartenmöbel aus Holz richtig auswählen und pflegen. Unser Ratgeber zeigt Holzarten, Preise und Pflegetipps für Terrasse und Balkon im Überblick.
---
# Gartenmöbel aus Holz

Gartenmöbel aus Holz sind beliebt. Sie sind robust und sehen gut aus. Jetzt mehr erfahren.

## Welche Gartenmöbel eignen sich für draußen?

Teak, Akazie und Eukalyptus sind **wetterfest**. Teak hält 30 Jahre. Akazie kostet 40 Prozent weniger.

- Teak
- Akazie
- Eukalyptus

## Pflege von Gartenmöbeln

Ölen Sie das Holz 2 Mal im Jahr. Hier finden Sie [unsere Pflegetipps](/pflege).

![Teakbank auf der Terrasse](bank.jpg)

## Gartenmöbel kaufen

Vergleichen Sie **Preise** und Qualität. Bestellen Sie jetzt kostenlos Muster.
";

struct ScriptedGenerator {
    drafts: Mutex<VecDeque<&'static str>>,
    calls: Mutex<u32>,
    cancel_on_call: Option<(u32, CancellationToken)>,
}

impl ScriptedGenerator {
    fn new(drafts: &[&'static str]) -> Self {
        Self {
            drafts: Mutex::new(drafts.iter().copied().collect()),
            calls: Mutex::new(0),
            cancel_on_call: None,
        }
    }

    fn cancelling(mut self, call: u32, cancel: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, cancel));
        self
    }
}

#[async_trait]
impl DraftGenerator for ScriptedGenerator {
    async fn generate(&self, _request: &DraftRequest) -> Result<Draft, CollaboratorError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if let Some((on_call, cancel)) = &self.cancel_on_call {
            if *on_call == call {
                cancel.cancel();
            }
        }
        self.drafts
            .lock()
            .unwrap()
            .pop_front()
            .map(Draft::new)
            .ok_or_else(|| CollaboratorError::InvalidResponse("no more drafts".to_string()))
    }
}

struct UnreachableAnalyzer;

#[async_trait]
impl CompetitorAnalyzer for UnreachableAnalyzer {
    async fn analyze(&self, _keyword: &str) -> Result<CompetitorContext, CollaboratorError> {
        Err(CollaboratorError::Network("connection refused".to_string()))
    }
}

fn config(target_score: f64, max_iterations: u32) -> Config {
    let mut config = Config::default();
    config.optimization.target_score = target_score;
    config.optimization.max_iterations = max_iterations;
    config
}

fn build(
    config: &Config,
    analyzer: Arc<dyn CompetitorAnalyzer>,
    generator: ScriptedGenerator,
) -> OptimizationLoop {
    let scorer = Scorer::new(config.scoring.clone()).unwrap();
    OptimizationLoop::from_config(config, analyzer, Arc::new(generator), Arc::new(scorer))
        .with_retry(RetryPolicy::new(1, Duration::from_secs(5), 1, 2))
}

#[tokio::test]
async fn test_revision_improves_score_and_persists_history() {
    let config = config(99.0, 2);
    let history = Arc::new(InMemoryHistoryStore::new());
    let optimization = build(
        &config,
        Arc::new(StaticCompetitorAnalyzer::empty()),
        ScriptedGenerator::new(&[THIN_DRAFT, RICH_DRAFT]),
    )
    .with_history(Arc::clone(&history) as Arc<dyn HistoryStore>);

    let outcome = optimization
        .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
        .await;

    let RunOutcome::Stopped {
        reason,
        final_draft,
        history: reports,
        ..
    } = &outcome
    else {
        panic!("expected a stopped run, got {outcome:?}");
    };
    assert_eq!(*reason, StopReason::MaxIterations);
    assert_eq!(final_draft.text, RICH_DRAFT);
    assert_eq!(reports.len(), 2);
    assert!(reports[1].total_score() > reports[0].total_score());

    let stored = history.load(outcome.run_id()).await.unwrap();
    let stored_reports: Vec<_> = stored.into_iter().map(|e| e.report).collect();
    assert_eq!(&stored_reports, reports);
}

#[tokio::test]
async fn test_reachable_target_stops_after_first_pass() {
    let config = config(1.0, 5);
    let outcome = build(
        &config,
        Arc::new(StaticCompetitorAnalyzer::empty()),
        ScriptedGenerator::new(&[RICH_DRAFT]),
    )
    .run(RunRequest::new("gartenmöbel", ContentType::Guide), &CancellationToken::new())
    .await;

    assert!(matches!(
        outcome,
        RunOutcome::Stopped {
            reason: StopReason::TargetReached,
            ..
        }
    ));
    assert_eq!(outcome.scoring_passes(), 1);
}

#[tokio::test]
async fn test_unreachable_analyzer_aborts_without_scoring() {
    let config = config(75.0, 5);
    let outcome = build(
        &config,
        Arc::new(UnreachableAnalyzer),
        ScriptedGenerator::new(&[RICH_DRAFT]),
    )
    .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
    .await;

    match outcome {
        RunOutcome::Aborted {
            reason, detail, history, ..
        } => {
            assert_eq!(reason, AbortReason::ExternalFailure);
            assert!(detail.contains("2 attempt(s)"));
            assert!(history.is_empty());
        }
        other => panic!("expected an aborted run, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancellation_between_iterations_keeps_partial_history() {
    let cancel = CancellationToken::new();
    let config = config(99.0, 5);
    let generator = ScriptedGenerator::new(&[THIN_DRAFT, RICH_DRAFT]).cancelling(1, cancel.clone());

    let outcome = build(&config, Arc::new(StaticCompetitorAnalyzer::empty()), generator)
        .run(RunRequest::new("gartenmöbel", ContentType::Blog), &cancel)
        .await;

    assert!(matches!(
        outcome,
        RunOutcome::Aborted {
            reason: AbortReason::Cancelled,
            ..
        }
    ));
    assert_eq!(outcome.scoring_passes(), 1);
}

#[tokio::test]
async fn test_invalid_target_aborts_with_zero_passes() {
    let config = config(0.0, 5);
    let outcome = build(
        &config,
        Arc::new(StaticCompetitorAnalyzer::empty()),
        ScriptedGenerator::new(&[RICH_DRAFT]),
    )
    .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
    .await;

    assert!(matches!(
        outcome,
        RunOutcome::Aborted {
            reason: AbortReason::InvalidInput,
            ..
        }
    ));
    assert_eq!(outcome.scoring_passes(), 0);
}
