//! The optimization loop: draft, score, decide, revise.
//!
//! One call to [`OptimizationLoop::run`] drives a single keyword through
//! `Init -> Scoring -> Deciding -> {Continuing -> Scoring | Stopped | Aborted}`
//! and always returns a [`RunOutcome`].

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::models::{
    AbortReason, CompetitorContext, Config, ContentType, ConvergenceState, Decision, Draft,
    DraftRequest, LoopPhase, RunOutcome, ScoreReport, StopReason,
};
use crate::domain::ports::{CompetitorAnalyzer, DraftGenerator, HistoryStore};
use crate::services::convergence_policy::ConvergencePolicy;
use crate::services::retry::{CallError, RetryPolicy};
use crate::services::revision_hints::build_hints;
use crate::services::scorer::DraftScorer;

/// A single optimization run request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub keyword: String,
    pub content_type: ContentType,
    /// Overrides the competitor recommendation and the configured default.
    pub target_word_count: Option<usize>,
}

impl RunRequest {
    pub fn new(keyword: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            keyword: keyword.into(),
            content_type,
            target_word_count: None,
        }
    }

    #[must_use]
    pub const fn with_word_count(mut self, words: usize) -> Self {
        self.target_word_count = Some(words);
        self
    }
}

/// Loop targets taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub target_score: f64,
    pub max_iterations: u32,
    pub default_word_count: usize,
}

impl LoopSettings {
    pub const fn from_config(config: &Config) -> Self {
        Self {
            target_score: config.optimization.target_score,
            max_iterations: config.optimization.max_iterations,
            default_word_count: config.optimization.default_word_count,
        }
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Orchestrates draft generation, scoring and the convergence policy.
///
/// The loop holds no per-run state; every run owns its own
/// [`ConvergenceState`], so one loop can serve concurrent runs.
pub struct OptimizationLoop {
    analyzer: Arc<dyn CompetitorAnalyzer>,
    generator: Arc<dyn DraftGenerator>,
    scorer: Arc<dyn DraftScorer>,
    history: Option<Arc<dyn HistoryStore>>,
    policy: ConvergencePolicy,
    retry: RetryPolicy,
    settings: LoopSettings,
}

impl OptimizationLoop {
    /// Create a loop with default policy, retry and settings.
    pub fn new(
        analyzer: Arc<dyn CompetitorAnalyzer>,
        generator: Arc<dyn DraftGenerator>,
        scorer: Arc<dyn DraftScorer>,
    ) -> Self {
        Self {
            analyzer,
            generator,
            scorer,
            history: None,
            policy: ConvergencePolicy::default(),
            retry: RetryPolicy::default(),
            settings: LoopSettings::default(),
        }
    }

    /// Create a loop configured from `config`.
    pub fn from_config(
        config: &Config,
        analyzer: Arc<dyn CompetitorAnalyzer>,
        generator: Arc<dyn DraftGenerator>,
        scorer: Arc<dyn DraftScorer>,
    ) -> Self {
        Self::new(analyzer, generator, scorer)
            .with_policy(ConvergencePolicy::new(config.optimization.no_improvement_epsilon))
            .with_retry(RetryPolicy::from_config(&config.retry))
            .with_settings(LoopSettings::from_config(config))
    }

    /// Persist every report to `store`.
    #[must_use]
    pub fn with_history(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: ConvergencePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub const fn with_settings(mut self, settings: LoopSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run independent optimizations concurrently.
    ///
    /// Outcomes are returned in request order.
    pub async fn run_many(
        &self,
        requests: Vec<RunRequest>,
        cancel: &CancellationToken,
    ) -> Vec<RunOutcome> {
        join_all(requests.into_iter().map(|request| self.run(request, cancel))).await
    }

    /// Optimize one keyword until the convergence policy stops the run, a
    /// collaborator keeps failing, or `cancel` fires.
    pub async fn run(&self, request: RunRequest, cancel: &CancellationToken) -> RunOutcome {
        let run = Run {
            id: Uuid::new_v4(),
            keyword: request.keyword.trim().to_string(),
        };
        run.transition(LoopPhase::Init, 0);

        // Init
        if let Err(detail) = self.validate(&run.keyword) {
            return run.abort(AbortReason::InvalidInput, detail, Vec::new());
        }

        let analyzer = &self.analyzer;
        let keyword = run.keyword.as_str();
        let competitors = match self
            .retry
            .execute("competitor_analysis", cancel, move || analyzer.analyze(keyword))
            .await
        {
            Ok(competitors) => competitors,
            Err(err) => return run.call_failed(err, Vec::new()),
        };

        let mut draft_request = DraftRequest {
            keyword: run.keyword.clone(),
            content_type: request.content_type,
            target_word_count: self.target_word_count(&request, &competitors),
            topics: competitors.common_topics.clone(),
            hints: None,
        };
        let mut draft = match self.generate(&draft_request, cancel).await {
            Ok(draft) => draft,
            Err(err) => return run.call_failed(err, Vec::new()),
        };

        let mut state =
            ConvergenceState::new(self.settings.target_score, self.settings.max_iterations);

        loop {
            // Scoring
            let iteration = state.iterations_used() + 1;
            run.transition(LoopPhase::Scoring, iteration);
            let report = self.scorer.score(iteration, &draft, &run.keyword, &competitors);
            self.persist(&run, &report).await;
            if let Err(err) = state.record(report) {
                return run.abort(AbortReason::InvalidInput, err.to_string(), state.into_history());
            }

            // Deciding
            if cancel.is_cancelled() {
                return run.cancelled(state.into_history());
            }
            run.transition(LoopPhase::Deciding, iteration);

            let weak_categories = match self.policy.decide(&state) {
                Decision::Stop { reason } => return run.stop(reason, draft, state),
                Decision::Abort { reason } => {
                    return run.abort(
                        reason,
                        "convergence policy aborted".to_string(),
                        state.into_history(),
                    );
                }
                Decision::Continue { weak_categories } => weak_categories,
            };

            // Continuing
            if cancel.is_cancelled() {
                return run.cancelled(state.into_history());
            }
            run.transition(LoopPhase::Continuing, iteration);

            let Some(latest) = state.latest() else {
                return run.abort(
                    AbortReason::InvalidInput,
                    "no score recorded".to_string(),
                    state.into_history(),
                );
            };
            draft_request.hints = Some(build_hints(
                latest,
                weak_categories,
                self.scorer.config(),
                draft,
            ));
            draft = match self.generate(&draft_request, cancel).await {
                Ok(draft) => draft,
                Err(err) => return run.call_failed(err, state.into_history()),
            };
        }
    }

    fn validate(&self, keyword: &str) -> Result<(), String> {
        if keyword.is_empty() {
            return Err("keyword must not be empty".to_string());
        }
        let weights = self.scorer.weights();
        if !weights.is_valid() {
            return Err(format!("category weights sum to {}, expected 1.0", weights.sum()));
        }
        if self.settings.max_iterations == 0 {
            return Err("max_iterations must be at least 1".to_string());
        }
        let target = self.settings.target_score;
        if !target.is_finite() || !(1.0..=100.0).contains(&target) {
            return Err(format!("target_score must be between 1 and 100, got {target}"));
        }
        Ok(())
    }

    fn target_word_count(&self, request: &RunRequest, competitors: &CompetitorContext) -> usize {
        request
            .target_word_count
            .or(competitors.recommended_word_count)
            .filter(|words| *words > 0)
            .unwrap_or(self.settings.default_word_count)
    }

    async fn generate(
        &self,
        request: &DraftRequest,
        cancel: &CancellationToken,
    ) -> Result<Draft, CallError> {
        let generator = &self.generator;
        self.retry
            .execute("draft_generation", cancel, move || generator.generate(request))
            .await
    }

    async fn persist(&self, run: &Run, report: &ScoreReport) {
        let Some(store) = &self.history else {
            return;
        };
        if let Err(err) = store.append(run.id, report).await {
            tracing::warn!(
                run_id = %run.id,
                keyword = %run.keyword,
                iteration = report.iteration(),
                error = %err,
                "Failed to persist score report"
            );
        }
    }
}

/// Identity of a run, carried into every log line and outcome.
struct Run {
    id: Uuid,
    keyword: String,
}

impl Run {
    fn transition(&self, phase: LoopPhase, iteration: u32) {
        tracing::debug!(
            run_id = %self.id,
            keyword = %self.keyword,
            iteration,
            phase = %phase,
            "Optimization loop transition"
        );
    }

    fn stop(self, reason: StopReason, final_draft: Draft, state: ConvergenceState) -> RunOutcome {
        let history = state.into_history();
        let Some(final_report) = history.last().cloned() else {
            return self.abort(
                AbortReason::InvalidInput,
                "stopped without a report".to_string(),
                history,
            );
        };
        self.transition(LoopPhase::Stopped, final_report.iteration());
        tracing::info!(
            run_id = %self.id,
            keyword = %self.keyword,
            iteration = final_report.iteration(),
            total_score = final_report.total_score(),
            reason = %reason,
            "Optimization run stopped"
        );
        RunOutcome::Stopped {
            run_id: self.id,
            keyword: self.keyword,
            reason,
            final_report,
            final_draft,
            history,
        }
    }

    fn abort(self, reason: AbortReason, detail: String, history: Vec<ScoreReport>) -> RunOutcome {
        let iteration = u32::try_from(history.len()).unwrap_or(u32::MAX);
        self.transition(LoopPhase::Aborted, iteration);
        tracing::warn!(
            run_id = %self.id,
            keyword = %self.keyword,
            iteration,
            reason = %reason,
            detail = %detail,
            "Optimization run aborted"
        );
        RunOutcome::Aborted {
            run_id: self.id,
            keyword: self.keyword,
            reason,
            detail,
            history,
        }
    }

    fn cancelled(self, history: Vec<ScoreReport>) -> RunOutcome {
        self.abort(AbortReason::Cancelled, "run was cancelled".to_string(), history)
    }

    fn call_failed(self, err: CallError, history: Vec<ScoreReport>) -> RunOutcome {
        match err {
            CallError::Cancelled => self.cancelled(history),
            err @ CallError::Exhausted { .. } => {
                self.abort(AbortReason::ExternalFailure, err.to_string(), history)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CategoryWeights, DraftReference, HistoryEntry, ScoringConfig};
    use crate::domain::ports::CollaboratorError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Drafts are "score:<n>" and score uniformly as n.
    struct FixedScorer {
        config: ScoringConfig,
    }

    impl FixedScorer {
        fn with_weights(weights: CategoryWeights) -> Self {
            Self {
                config: ScoringConfig {
                    weights,
                    ..ScoringConfig::default()
                },
            }
        }
    }

    impl DraftScorer for FixedScorer {
        fn config(&self) -> &ScoringConfig {
            &self.config
        }

        fn score(
            &self,
            iteration: u32,
            draft: &Draft,
            _: &str,
            _: &CompetitorContext,
        ) -> ScoreReport {
            let value: f64 = draft
                .text
                .trim_start_matches("score:")
                .parse()
                .unwrap_or(0.0);
            ScoreReport::from_category_values(
                iteration,
                self.weights(),
                |_| value,
                DraftReference::for_text(&draft.text, 1),
            )
        }
    }

    struct ScriptedGenerator {
        drafts: Mutex<VecDeque<Result<Draft, CollaboratorError>>>,
        requests: Mutex<Vec<DraftRequest>>,
    }

    impl ScriptedGenerator {
        fn scores(scores: &[f64]) -> Self {
            Self::new(scores.iter().map(|s| Ok(Draft::new(format!("score:{s}")))).collect())
        }

        fn new(drafts: Vec<Result<Draft, CollaboratorError>>) -> Self {
            Self {
                drafts: Mutex::new(drafts.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<DraftRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DraftGenerator for ScriptedGenerator {
        async fn generate(&self, request: &DraftRequest) -> Result<Draft, CollaboratorError> {
            self.requests.lock().unwrap().push(request.clone());
            self.drafts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(CollaboratorError::InvalidResponse("script exhausted".into()))
                })
        }
    }

    struct NoCompetitors;

    #[async_trait]
    impl CompetitorAnalyzer for NoCompetitors {
        async fn analyze(&self, keyword: &str) -> Result<CompetitorContext, CollaboratorError> {
            Ok(CompetitorContext::empty(keyword))
        }
    }

    #[derive(Default)]
    struct RecordingHistory {
        reports: Mutex<Vec<(Uuid, u32)>>,
    }

    #[async_trait]
    impl HistoryStore for RecordingHistory {
        async fn append(
            &self,
            run_id: Uuid,
            report: &ScoreReport,
        ) -> Result<(), CollaboratorError> {
            self.reports.lock().unwrap().push((run_id, report.iteration()));
            Ok(())
        }

        async fn load(&self, _: Uuid) -> Result<Vec<HistoryEntry>, CollaboratorError> {
            Ok(Vec::new())
        }
    }

    fn settings(target_score: f64, max_iterations: u32) -> LoopSettings {
        LoopSettings {
            target_score,
            max_iterations,
            ..LoopSettings::default()
        }
    }

    fn optimization_loop(
        generator: Arc<ScriptedGenerator>,
        settings: LoopSettings,
    ) -> OptimizationLoop {
        OptimizationLoop::new(
            Arc::new(NoCompetitors),
            generator,
            Arc::new(FixedScorer::with_weights(CategoryWeights::default())),
        )
        .with_retry(RetryPolicy::new(1, Duration::from_secs(5), 1, 1))
        .with_settings(settings)
    }

    fn totals(outcome: &RunOutcome) -> Vec<f64> {
        outcome.history().iter().map(ScoreReport::total_score).collect()
    }

    #[tokio::test]
    async fn test_stops_when_target_reached() {
        let generator = Arc::new(ScriptedGenerator::scores(&[40.0, 60.0, 78.0]));
        let outcome = optimization_loop(Arc::clone(&generator), settings(75.0, 3))
            .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
            .await;

        match &outcome {
            RunOutcome::Stopped {
                reason,
                final_report,
                final_draft,
                ..
            } => {
                assert_eq!(*reason, StopReason::TargetReached);
                assert_eq!(final_report.iteration(), 3);
                assert_eq!(final_draft.text, "score:78");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(outcome.history().len(), 3);
    }

    #[tokio::test]
    async fn test_stops_at_iteration_budget() {
        let generator = Arc::new(ScriptedGenerator::scores(&[40.0, 55.0, 68.0, 95.0]));
        let outcome = optimization_loop(Arc::clone(&generator), settings(90.0, 3))
            .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
            .await;

        assert!(matches!(
            outcome,
            RunOutcome::Stopped {
                reason: StopReason::MaxIterations,
                ..
            }
        ));
        assert_eq!(outcome.history().len(), 3);
        assert_eq!(generator.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_stops_without_improvement() {
        let generator = Arc::new(ScriptedGenerator::scores(&[70.0, 70.5, 99.0]));
        let outcome = optimization_loop(generator, settings(75.0, 5))
            .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
            .await;

        assert!(matches!(
            outcome,
            RunOutcome::Stopped {
                reason: StopReason::NoImprovement,
                ..
            }
        ));
        assert_eq!(totals(&outcome).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_keyword_is_invalid_input() {
        let generator = Arc::new(ScriptedGenerator::scores(&[80.0]));
        let outcome = optimization_loop(Arc::clone(&generator), settings(75.0, 5))
            .run(RunRequest::new("   ", ContentType::Blog), &CancellationToken::new())
            .await;

        assert!(matches!(
            outcome,
            RunOutcome::Aborted {
                reason: AbortReason::InvalidInput,
                ..
            }
        ));
        assert_eq!(outcome.scoring_passes(), 0);
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_settings_are_rejected() {
        for settings in [settings(75.0, 0), settings(0.5, 3), settings(150.0, 3)] {
            let generator = Arc::new(ScriptedGenerator::scores(&[80.0]));
            let outcome = optimization_loop(generator, settings)
                .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
                .await;
            assert!(matches!(
                outcome,
                RunOutcome::Aborted {
                    reason: AbortReason::InvalidInput,
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn test_weights_not_summing_to_one_are_rejected() {
        let generator = Arc::new(ScriptedGenerator::scores(&[80.0]));
        let weights = CategoryWeights {
            keyword_optimization: 0.5,
            ..CategoryWeights::default()
        };
        let outcome = OptimizationLoop::new(
            Arc::new(NoCompetitors),
            Arc::clone(&generator) as Arc<dyn DraftGenerator>,
            Arc::new(FixedScorer::with_weights(weights)),
        )
        .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
        .await;

        match &outcome {
            RunOutcome::Aborted { reason, detail, .. } => {
                assert_eq!(*reason, AbortReason::InvalidInput);
                assert!(detail.contains("category weights"), "{detail}");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(outcome.scoring_passes(), 0);
        assert!(generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_scoring_passes_never_exceed_budget() {
        for max_iterations in 1..=8u32 {
            let scores: Vec<f64> = (0..max_iterations + 4).map(|i| 50.0 - f64::from(i)).collect();
            let generator = Arc::new(ScriptedGenerator::scores(&scores));
            let outcome = optimization_loop(Arc::clone(&generator), settings(100.0, max_iterations))
                .with_policy(ConvergencePolicy::new(-1000.0))
                .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
                .await;

            assert!(
                matches!(
                    outcome,
                    RunOutcome::Stopped {
                        reason: StopReason::MaxIterations,
                        ..
                    }
                ),
                "N={max_iterations}: {outcome:?}"
            );
            assert_eq!(outcome.scoring_passes(), usize::try_from(max_iterations).unwrap());
            assert_eq!(generator.requests().len(), usize::try_from(max_iterations).unwrap());
        }
    }

    #[tokio::test]
    async fn test_revision_requests_carry_hints() {
        let generator = Arc::new(ScriptedGenerator::scores(&[40.0, 80.0]));
        optimization_loop(Arc::clone(&generator), settings(75.0, 5))
            .run(
                RunRequest::new("gartenmöbel", ContentType::Guide).with_word_count(1500),
                &CancellationToken::new(),
            )
            .await;

        let requests = generator.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].hints.is_none());
        assert_eq!(requests[0].target_word_count, 1500);
        assert_eq!(requests[0].content_type, ContentType::Guide);

        let hints = requests[1].hints.as_ref().unwrap();
        assert_eq!(hints.weak_categories.len(), 5);
        assert_eq!(hints.previous_draft.text, "score:40");
    }

    #[tokio::test]
    async fn test_generator_failure_aborts_with_partial_history() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(Draft::new("score:40")),
            Err(CollaboratorError::RateLimited),
            Err(CollaboratorError::RateLimited),
        ]));
        let outcome = optimization_loop(Arc::clone(&generator), settings(75.0, 5))
            .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
            .await;

        assert!(matches!(
            outcome,
            RunOutcome::Aborted {
                reason: AbortReason::ExternalFailure,
                ..
            }
        ));
        assert_eq!(outcome.history().len(), 1);
        // first draft + initial revision attempt + one retry
        assert_eq!(generator.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let generator = Arc::new(ScriptedGenerator::scores(&[40.0]));
        let outcome = optimization_loop(generator, settings(75.0, 5))
            .run(RunRequest::new("gartenmöbel", ContentType::Blog), &cancel)
            .await;

        assert!(matches!(
            outcome,
            RunOutcome::Aborted {
                reason: AbortReason::Cancelled,
                ..
            }
        ));
        assert_eq!(outcome.scoring_passes(), 0);
    }

    #[tokio::test]
    async fn test_reports_are_persisted() {
        let history = Arc::new(RecordingHistory::default());
        let generator = Arc::new(ScriptedGenerator::scores(&[40.0, 60.0, 78.0]));
        let outcome = optimization_loop(generator, settings(75.0, 5))
            .with_history(Arc::clone(&history) as Arc<dyn HistoryStore>)
            .run(RunRequest::new("gartenmöbel", ContentType::Blog), &CancellationToken::new())
            .await;

        let stored = history.reports.lock().unwrap().clone();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().all(|(id, _)| *id == outcome.run_id()));
        assert_eq!(stored.iter().map(|(_, i)| *i).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_run_many_keeps_request_order() {
        let generator = Arc::new(ScriptedGenerator::scores(&[80.0, 90.0]));
        let outcomes = optimization_loop(generator, settings(75.0, 5))
            .run_many(
                vec![
                    RunRequest::new("gartenmöbel", ContentType::Blog),
                    RunRequest::new("", ContentType::Blog),
                ],
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].keyword(), "gartenmöbel");
        assert!(outcomes[0].is_stopped());
        assert!(!outcomes[1].is_stopped());
    }
}
