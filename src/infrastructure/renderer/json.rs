use crate::domain::models::RunOutcome;
use crate::domain::ports::ReportRenderer;

/// Renders outcomes as pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, outcome: &RunOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize run outcome");
            format!(r#"{{"error": "failed to serialize run outcome: {e}"}}"#)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AbortReason;
    use uuid::Uuid;

    #[test]
    fn test_renders_tagged_outcome() {
        let outcome = RunOutcome::Aborted {
            run_id: Uuid::nil(),
            keyword: "teak".to_string(),
            reason: AbortReason::InvalidInput,
            detail: "keyword must not be empty".to_string(),
            history: Vec::new(),
        };

        let value: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render(&outcome)).unwrap();
        assert_eq!(value["outcome"], "aborted");
        assert_eq!(value["reason"], "invalid_input");
        assert_eq!(value["keyword"], "teak");
    }
}
