pub mod convergence_policy;
pub mod metrics;
pub mod optimization_loop;
pub mod retry;
pub mod revision_hints;
pub mod scorer;

pub use convergence_policy::{ConvergencePolicy, DEFAULT_NO_IMPROVEMENT_EPSILON};
pub use optimization_loop::{LoopSettings, OptimizationLoop, RunRequest};
pub use retry::{CallError, RetryPolicy};
pub use revision_hints::{build_hints, suggestions};
pub use scorer::{DraftScorer, Scorer};
