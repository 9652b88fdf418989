//! Drafts, content types and the requests sent to a draft generator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::category::Category;

/// A candidate content text for one iteration.
///
/// The text is either Markdown (optionally with YAML front matter carrying
/// `title` and `description`) or HTML, detected by a leading `<`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Full draft text as produced by the generator.
    pub text: String,
}

impl Draft {
    /// Wrap a draft text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the draft has no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Focus a content type steers the generator towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFocus {
    /// Explain thoroughly, provide value.
    Information,
    /// Highlight benefits, motivate action.
    Conversion,
    /// Step-by-step instructions, practical tips.
    Education,
    /// Objective comparison with pros and cons.
    Comparison,
}

/// Kind of page being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Blog article.
    #[default]
    Blog,
    /// Product description.
    Product,
    /// Category landing page.
    Category,
    /// How-to guide.
    Guide,
    /// Comparison article.
    Comparison,
}

impl ContentType {
    /// Stable identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Product => "product",
            Self::Category => "category",
            Self::Guide => "guide",
            Self::Comparison => "comparison",
        }
    }

    /// Description used in generation prompts.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Blog => "Blog article / advice piece",
            Self::Product => "Product description",
            Self::Category => "Category page text",
            Self::Guide => "How-to guide",
            Self::Comparison => "Comparison article",
        }
    }

    /// Focus of this content type.
    pub const fn focus(&self) -> ContentFocus {
        match self {
            Self::Blog => ContentFocus::Information,
            Self::Product | Self::Category => ContentFocus::Conversion,
            Self::Guide => ContentFocus::Education,
            Self::Comparison => ContentFocus::Comparison,
        }
    }

    /// Whether the text must contain calls to action.
    pub const fn requires_cta(&self) -> bool {
        matches!(self, Self::Product | Self::Category)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blog" => Ok(Self::Blog),
            "product" => Ok(Self::Product),
            "category" => Ok(Self::Category),
            "guide" => Ok(Self::Guide),
            "comparison" => Ok(Self::Comparison),
            other => Err(format!(
                "unknown content type '{other}' (expected blog, product, category, guide, comparison)"
            )),
        }
    }
}

/// Improvement hints attached to a revision request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionHints {
    /// All categories of the latest report, weakest first.
    pub weak_categories: Vec<Category>,
    /// Concrete suggestions for categories below the weak threshold.
    pub suggestions: Vec<String>,
    /// The draft being revised.
    pub previous_draft: Draft,
}

/// What the loop asks a draft generator for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRequest {
    /// Target keyword.
    pub keyword: String,
    /// Kind of page.
    pub content_type: ContentType,
    /// Desired length in words.
    pub target_word_count: usize,
    /// Topics competitors cover, most frequent first.
    pub topics: Vec<String>,
    /// `None` for the first draft, set for every revision.
    pub hints: Option<RevisionHints>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_str() {
        assert_eq!("Guide".parse::<ContentType>().unwrap(), ContentType::Guide);
        assert!("ratgeber".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_conversion_types_require_cta() {
        assert!(ContentType::Product.requires_cta());
        assert!(!ContentType::Blog.requires_cta());
        assert_eq!(ContentType::Category.focus(), ContentFocus::Conversion);
    }

    #[test]
    fn test_blank_draft() {
        assert!(Draft::new("  \n\t").is_blank());
        assert!(!Draft::new("# Title").is_blank());
    }
}
