//! Decides, from the score history of a run, whether to stop or continue.

use crate::domain::models::{Category, ConvergenceState, Decision, StopReason};

/// Default minimum improvement between two iterations.
pub const DEFAULT_NO_IMPROVEMENT_EPSILON: f64 = 1.0;

/// Stop/continue rules for the optimization loop.
///
/// The policy is a pure function of the [`ConvergenceState`]; it never
/// returns [`Decision::Abort`], which is reserved for the loop's own input
/// validation and collaborator failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergencePolicy {
    no_improvement_epsilon: f64,
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_NO_IMPROVEMENT_EPSILON)
    }
}

impl ConvergencePolicy {
    /// Policy that stops when an iteration improves by less than `epsilon`.
    pub const fn new(no_improvement_epsilon: f64) -> Self {
        Self {
            no_improvement_epsilon,
        }
    }

    /// Evaluate the rules, in priority order:
    /// 1. Empty history -> continue, every category weak (canonical order)
    /// 2. Latest total reached the target -> stop, target reached
    /// 3. Iteration budget used up -> stop, max iterations
    /// 4. Improvement over the previous report below epsilon -> stop, no improvement
    /// 5. Otherwise -> continue, categories weakest first
    pub fn decide(&self, state: &ConvergenceState) -> Decision {
        // 1. Nothing scored yet
        let Some(latest) = state.latest() else {
            return Decision::Continue {
                weak_categories: Category::ALL.to_vec(),
            };
        };

        // 2. Target reached
        if latest.total_score() >= state.target_score() {
            return Decision::Stop {
                reason: StopReason::TargetReached,
            };
        }

        // 3. Budget exhausted
        if state.iterations_used() >= state.max_iterations() {
            return Decision::Stop {
                reason: StopReason::MaxIterations,
            };
        }

        // 4. Plateau or regression
        if let Some(previous) = state.previous() {
            let improvement = latest.total_score() - previous.total_score();
            if improvement < self.no_improvement_epsilon {
                return Decision::Stop {
                    reason: StopReason::NoImprovement,
                };
            }
        }

        // 5. Keep refining
        Decision::Continue {
            weak_categories: latest.categories_by_weakness(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CategoryWeights, DraftReference, ScoreReport};

    fn uniform(iteration: u32, value: f64) -> ScoreReport {
        ScoreReport::from_category_values(
            iteration,
            &CategoryWeights::default(),
            |_| value,
            DraftReference::for_text("draft", 1),
        )
    }

    fn state_with(target: f64, max: u32, scores: &[f64]) -> ConvergenceState {
        let mut state = ConvergenceState::new(target, max);
        for (i, score) in scores.iter().enumerate() {
            state.record(uniform(i as u32 + 1, *score)).unwrap();
        }
        state
    }

    #[test]
    fn test_empty_history_continues_with_all_categories() {
        let decision = ConvergencePolicy::default().decide(&ConvergenceState::new(75.0, 5));
        assert_eq!(
            decision,
            Decision::Continue {
                weak_categories: Category::ALL.to_vec()
            }
        );
    }

    #[test]
    fn test_target_reached_wins_over_budget() {
        let state = state_with(75.0, 2, &[40.0, 80.0]);
        assert_eq!(
            ConvergencePolicy::default().decide(&state),
            Decision::Stop {
                reason: StopReason::TargetReached
            }
        );
    }

    #[test]
    fn test_target_reached_on_exact_score() {
        let state = state_with(75.0, 5, &[75.0]);
        assert_eq!(
            ConvergencePolicy::default().decide(&state),
            Decision::Stop {
                reason: StopReason::TargetReached
            }
        );
    }

    #[test]
    fn test_budget_exhausted() {
        let state = state_with(90.0, 3, &[40.0, 55.0, 68.0]);
        assert_eq!(
            ConvergencePolicy::default().decide(&state),
            Decision::Stop {
                reason: StopReason::MaxIterations
            }
        );
    }

    #[test]
    fn test_small_improvement_stops() {
        let state = state_with(75.0, 5, &[70.0, 70.5]);
        assert_eq!(
            ConvergencePolicy::new(1.0).decide(&state),
            Decision::Stop {
                reason: StopReason::NoImprovement
            }
        );
    }

    #[test]
    fn test_regression_stops() {
        let state = state_with(75.0, 5, &[60.0, 50.0]);
        assert_eq!(
            ConvergencePolicy::default().decide(&state),
            Decision::Stop {
                reason: StopReason::NoImprovement
            }
        );
    }

    #[test]
    fn test_continue_sorts_categories_ascending() {
        let values = [50.0, 20.0, 70.0, 20.0, 10.0];
        let report = ScoreReport::from_category_values(
            1,
            &CategoryWeights::default(),
            |c| values[Category::ALL.iter().position(|x| *x == c).unwrap()],
            DraftReference::for_text("draft", 1),
        );
        let mut state = ConvergenceState::new(75.0, 5);
        state.record(report).unwrap();

        assert_eq!(
            ConvergencePolicy::default().decide(&state),
            Decision::Continue {
                weak_categories: vec![
                    Category::Engagement,
                    Category::StructureReadability,
                    Category::TechnicalSeo,
                    Category::KeywordOptimization,
                    Category::ContentQuality,
                ]
            }
        );
    }

    #[test]
    fn test_sufficient_improvement_continues() {
        let state = state_with(75.0, 5, &[40.0, 60.0]);
        assert!(matches!(
            ConvergencePolicy::default().decide(&state),
            Decision::Continue { .. }
        ));
    }
}
