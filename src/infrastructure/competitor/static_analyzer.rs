use async_trait::async_trait;

use crate::domain::models::CompetitorContext;
use crate::domain::ports::{CompetitorAnalyzer, CollaboratorError};

/// Answers every keyword with the same context
#[derive(Debug, Clone, Default)]
pub struct StaticCompetitorAnalyzer {
    context: Option<CompetitorContext>,
}

impl StaticCompetitorAnalyzer {
    /// Analyzer that reports no competitor data
    pub fn empty() -> Self {
        Self::default()
    }

    /// Analyzer that always returns `context`, relabelled with the keyword asked for
    pub const fn fixed(context: CompetitorContext) -> Self {
        Self {
            context: Some(context),
        }
    }
}

#[async_trait]
impl CompetitorAnalyzer for StaticCompetitorAnalyzer {
    async fn analyze(&self, keyword: &str) -> Result<CompetitorContext, CollaboratorError> {
        Ok(self.context.as_ref().map_or_else(
            || CompetitorContext::empty(keyword),
            |context| CompetitorContext {
                keyword: keyword.to_string(),
                ..context.clone()
            },
        ))
    }
}
