use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::models::CompetitorContext;
use crate::domain::ports::{CompetitorAnalyzer, CollaboratorError};

/// Competitor data read from a YAML or JSON file
///
/// The file holds either a single context used for every keyword, or a
/// mapping from keyword to context. Keywords are matched case-insensitively;
/// a keyword missing from the mapping gets an empty context.
#[derive(Debug, Clone)]
pub struct FileCompetitorAnalyzer {
    data: CompetitorData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CompetitorData {
    PerKeyword(HashMap<String, CompetitorContext>),
    Single(CompetitorContext),
}

impl FileCompetitorAnalyzer {
    /// Read and parse `path`; `.json` files are parsed as JSON, everything else as YAML
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CollaboratorError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let data = if is_json {
            Self::parse_json(&contents)?
        } else {
            Self::parse_yaml(&contents)?
        };
        tracing::debug!(path = %path.display(), "loaded competitor data");
        Ok(Self { data })
    }

    /// Parse YAML competitor data
    pub fn from_yaml(contents: &str) -> Result<Self, CollaboratorError> {
        Ok(Self {
            data: Self::parse_yaml(contents)?,
        })
    }

    fn parse_yaml(contents: &str) -> Result<CompetitorData, CollaboratorError> {
        let data: CompetitorData = serde_yaml::from_str(contents)
            .map_err(|e| {
                CollaboratorError::InvalidResponse(format!("invalid competitor YAML: {e}"))
            })?;
        Ok(normalize(data))
    }

    fn parse_json(contents: &str) -> Result<CompetitorData, CollaboratorError> {
        Ok(normalize(serde_json::from_str(contents)?))
    }
}

// Context fields are scalars or lists, so a flat context never parses as a
// keyword map and `untagged` picks the right shape.
fn normalize(data: CompetitorData) -> CompetitorData {
    match data {
        CompetitorData::PerKeyword(map) => CompetitorData::PerKeyword(
            map.into_iter()
                .map(|(keyword, context)| (keyword.trim().to_lowercase(), context))
                .collect(),
        ),
        single @ CompetitorData::Single(_) => single,
    }
}

#[async_trait]
impl CompetitorAnalyzer for FileCompetitorAnalyzer {
    async fn analyze(&self, keyword: &str) -> Result<CompetitorContext, CollaboratorError> {
        let context = match &self.data {
            CompetitorData::Single(context) => Some(context.clone()),
            CompetitorData::PerKeyword(map) => map.get(&keyword.trim().to_lowercase()).cloned(),
        };

        Ok(context.map_or_else(
            || {
                tracing::debug!(keyword, "no competitor data for keyword");
                CompetitorContext::empty(keyword)
            },
            |context| CompetitorContext {
                keyword: keyword.to_string(),
                ..context
            },
        ))
    }
}
